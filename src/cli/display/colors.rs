//! Colors used in diagnostics and schema tables

use crate::domain::cluster::{AttributeMode, Severity};
use comfy_table::Color as TableColor;

#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub error: TableColor,
    pub warning: TableColor,
    pub required: TableColor,
    pub computed: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            error: TableColor::Red,
            warning: TableColor::Yellow,
            required: TableColor::Cyan,
            computed: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    pub fn get_severity_color(&self, severity: Severity) -> TableColor {
        match severity {
            Severity::Error => self.error,
            Severity::Warning => self.warning,
        }
    }

    pub fn get_mode_color(&self, mode: AttributeMode) -> TableColor {
        match mode {
            AttributeMode::Required => self.required,
            AttributeMode::Computed => self.computed,
        }
    }
}
