//! Status icons for CLI output

use crate::domain::cluster::Severity;

pub struct StatusIcon;

impl StatusIcon {
    pub const SUCCESS: &'static str = "✓";

    pub const WARNING: &'static str = "⚠";

    pub const ERROR: &'static str = "✗";

    /// Marker for sensitive attributes
    pub const SENSITIVE: &'static str = "🔒";

    pub fn get_severity_icon(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => Self::ERROR,
            Severity::Warning => Self::WARNING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_severity_icon() {
        assert_eq!(StatusIcon::get_severity_icon(Severity::Error), StatusIcon::ERROR);
        assert_eq!(
            StatusIcon::get_severity_icon(Severity::Warning),
            StatusIcon::WARNING
        );
    }
}
