//! Validation functions for configuration values.
//!
//! Directory checks used by the orchestrator before any archive work starts.

use validator::ValidationError;

use std::path::Path;

pub fn validate_dir_exist<P: AsRef<Path>>(dir: P) -> Result<(), ValidationError> {
    let dir = dir.as_ref();
    if dir.exists() {
        if !dir.is_dir() {
            return Err(ValidationError::new("InvalidDirectory")
                .with_message(format!("{:?} is not a directory", dir).into()));
        }
    } else {
        return Err(ValidationError::new("InvalidDirectory")
            .with_message(format!("{:?} not found", dir).into()));
    }

    Ok(())
}

pub fn validate_dir_exist_or_created<P: AsRef<Path>>(dir: P) -> Result<(), ValidationError> {
    let dir = dir.as_ref();
    if dir.exists() {
        if !dir.is_dir() {
            return Err(ValidationError::new("InvalidDirectory")
                .with_message(format!("{:?} is not a directory", dir).into()));
        }
    } else {
        return std::fs::create_dir_all(dir).map_err(|e| {
            ValidationError::new("InvalidDirectory").with_message(
                format!("cannot create or access backup directory {:?}: {}", dir, e).into(),
            )
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_dir_exist() {
        let temp_dir = TempDir::new().unwrap();
        assert!(validate_dir_exist(temp_dir.path()).is_ok());
    }

    #[test]
    fn test_validate_dir_exist_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = validate_dir_exist(temp_dir.path().join("nope")).unwrap_err();
        assert_eq!(err.code, "InvalidDirectory");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_validate_dir_exist_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, b"data").unwrap();

        let err = validate_dir_exist(&file).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
    }

    #[test]
    fn test_validate_dir_exist_or_created_creates_nested() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");

        assert!(validate_dir_exist_or_created(&nested).is_ok());
        assert!(nested.is_dir());
        // second call is a no-op
        assert!(validate_dir_exist_or_created(&nested).is_ok());
    }

    #[test]
    fn test_validate_dir_exist_or_created_rejects_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, b"data").unwrap();

        assert!(validate_dir_exist_or_created(&file).is_err());
    }
}
