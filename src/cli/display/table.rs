//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::cluster::{AttributeMode, Diagnostics, ResourceSchema, Severity};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render diagnostics of a lifecycle call, errors first
    pub fn render_diagnostics(&self, diagnostics: &Diagnostics) -> String {
        if diagnostics.is_empty() {
            return "No diagnostics".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("SEVERITY").set_alignment(CellAlignment::Center),
                Cell::new("SUMMARY").set_alignment(CellAlignment::Left),
                Cell::new("DETAIL").set_alignment(CellAlignment::Left),
            ]);

        for diagnostic in diagnostics.errors().chain(diagnostics.warnings()) {
            let color = self.theme.get_severity_color(diagnostic.severity);
            table.add_row(vec![
                Cell::new(format!(
                    "{} {}",
                    StatusIcon::get_severity_icon(diagnostic.severity),
                    diagnostic.severity.as_str()
                ))
                .fg(color),
                Cell::new(&diagnostic.summary).fg(color),
                Cell::new(diagnostic.detail.trim_end()),
            ]);
        }

        let errors = diagnostics.errors().count();
        let warnings = diagnostics.warnings().count();

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Diagnostics {} ─╮\n",
            format!("[{} error(s), {} warning(s)]", errors, warnings)
                .bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} {}  {} {}\n",
            StatusIcon::ERROR.red(),
            Severity::Error.as_str(),
            StatusIcon::WARNING.yellow(),
            Severity::Warning.as_str()
        ));

        output
    }

    /// Render resource schema attributes
    pub fn render_schema(&self, schema: &ResourceSchema) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("ATTRIBUTE").set_alignment(CellAlignment::Left),
                Cell::new("MODE").set_alignment(CellAlignment::Center),
                Cell::new("SENSITIVE").set_alignment(CellAlignment::Center),
                Cell::new("DESCRIPTION").set_alignment(CellAlignment::Left),
            ]);

        for attribute in &schema.attributes {
            let mode = match attribute.mode {
                AttributeMode::Required => "required",
                AttributeMode::Computed => "computed",
            };
            let sensitive = if attribute.sensitive {
                StatusIcon::SENSITIVE
            } else {
                ""
            };
            table.add_row(vec![
                Cell::new(attribute.name),
                Cell::new(mode)
                    .fg(self.theme.get_mode_color(attribute.mode))
                    .set_alignment(CellAlignment::Center),
                Cell::new(sensitive).set_alignment(CellAlignment::Center),
                Cell::new(attribute.description),
            ]);
        }

        format!("Resource {}\n{}", schema.type_name.bold(), table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cluster::cluster_schema;

    #[test]
    fn test_render_empty_diagnostics() {
        let renderer = TableRenderer::new();
        let output = renderer.render_diagnostics(&Diagnostics::new());
        assert!(output.contains("No diagnostics"));
    }

    #[test]
    fn test_render_diagnostics() {
        let renderer = TableRenderer::new();
        let mut diagnostics = Diagnostics::new();
        diagnostics.add_warning("Failed to clean up temporary files", "failed to remove id_dsa");
        diagnostics.add_error("Failed to run k0sctl apply", "ssh: handshake failed");

        let output = renderer.render_diagnostics(&diagnostics);
        assert!(output.contains("Failed to run k0sctl apply"));
        assert!(output.contains("ssh: handshake failed"));
        assert!(output.contains("failed to remove id_dsa"));
        assert!(
            output.find("Failed to run k0sctl apply").unwrap()
                < output.find("Failed to clean up temporary files").unwrap()
        );
    }

    #[test]
    fn test_render_schema() {
        let output = TableRenderer::new().render_schema(&cluster_schema());
        assert!(output.contains("k0s_cluster"));
        assert!(output.contains("ssh_private_key"));
        assert!(output.contains("computed"));
    }
}
