use thiserror::Error;

/// A local validation failure. Raised before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Unknown group \"{0}\"")]
    UnknownGroup(String),

    #[error("A group named \"{0}\" already exists")]
    DuplicateGroup(String),

    #[error("No athlete with id {0}")]
    UnknownAthlete(i64),

    #[error("No group with id {0}")]
    UnknownGroupId(i64),

    #[error("No schedule entry with id {0}")]
    UnknownSchedule(i64),
}

/// Fail with `MissingField` when `value` is empty or whitespace only.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert!(require("name", "Anna").is_ok());
        assert_eq!(require("name", ""), Err(ValidationError::MissingField("name")));
        assert_eq!(require("name", "   "), Err(ValidationError::MissingField("name")));
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::MissingField("group").to_string(), "group is required");
        assert_eq!(
            ValidationError::UnknownGroup("Boxers".into()).to_string(),
            "Unknown group \"Boxers\""
        );
    }
}
