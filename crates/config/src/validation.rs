//! Section validation
//!
//! Every config section validates itself and reports all problems at once,
//! so a user fixing `config.toml` sees the whole list in one pass.

pub use crate::error::ValidationError;
use std::path::Path;

/// A named block of `config.toml`
///
/// Implemented by `AppConfig` and `LibraryConfig`.
pub trait ConfigSection: Default {
    /// Returns every invalid field, or Ok when the section is usable
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Overwrites this section with `other`
    fn merge(&mut self, other: Self);

    /// Table name in the TOML file
    fn section_name(&self) -> &'static str;
}

/// Field-level checks shared by the sections
pub struct Validator;

impl Validator {
    /// Checks an inclusive numeric range
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Rejects an empty path or one that names an existing directory
    pub fn file_path(path: &Path, field: &str) -> Result<(), ValidationError> {
        if path.as_os_str().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else if path.is_dir() {
            Err(ValidationError::with_value(
                field,
                "must name a file, not a directory",
                path.display(),
            ))
        } else {
            Ok(())
        }
    }

    /// Folds individual field results into one section result
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_in_range_bounds_inclusive() {
        assert!(Validator::in_range(1, 1, 64, "test").is_ok());
        assert!(Validator::in_range(64, 1, 64, "test").is_ok());
        assert!(Validator::in_range(0, 1, 64, "test").is_err());
        assert!(Validator::in_range(65, 1, 64, "test").is_err());
    }

    #[test]
    fn test_file_path() {
        assert!(Validator::file_path(&PathBuf::from("tabby.db"), "test").is_ok());
        assert!(Validator::file_path(&PathBuf::new(), "test").is_err());

        let dir = tempfile::TempDir::new().unwrap();
        assert!(Validator::file_path(dir.path(), "test").is_err());
    }

    #[test]
    fn test_collect_errors_keeps_every_failure() {
        let results = vec![
            Ok(()),
            Err(ValidationError::new("app.max_connections", "too small")),
            Err(ValidationError::new("library.max_category_name_length", "too big")),
        ];
        assert_eq!(Validator::collect_errors(results).unwrap_err().len(), 2);
        assert!(Validator::collect_errors(vec![Ok(())]).is_ok());
    }
}
