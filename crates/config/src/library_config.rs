//! Library and category configuration section

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Category naming rules
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LibraryConfig {
    /// Longest category name accepted, in characters
    pub max_category_name_length: usize,

    /// Strip leading/trailing whitespace from new category names
    pub trim_category_names: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            max_category_name_length: 64,
            trim_category_names: true,
        }
    }
}

impl ConfigSection for LibraryConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![Validator::in_range(
            self.max_category_name_length,
            1,
            256,
            "library.max_category_name_length",
        )])
    }

    fn merge(&mut self, other: Self) {
        self.max_category_name_length = other.max_category_name_length;
        self.trim_category_names = other.trim_category_names;
    }

    fn section_name(&self) -> &'static str {
        "library"
    }
}
