//! Validation failures raised before anything is written.

use non_empty_string::NonEmptyString;

/// A record was rejected before being written.
///
/// Validation happens in full before any mutation, so a rejected record never
/// leaves a partial write behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was empty.
    #[error("{0} is required")]
    Missing(&'static str),

    /// More questions were marked answered than exist.
    #[error("answered questions ({answered}) cannot exceed total questions ({total})")]
    AnsweredExceedsTotal {
        /// The answered count supplied.
        answered: u32,
        /// The total count supplied.
        total: u32,
    },

    /// A follow-up was given an empty set of types.
    #[error("a follow-up needs at least one type")]
    NoTypes,

    /// The only remaining type of a follow-up cannot be removed.
    #[error("cannot remove '{0}': a follow-up needs at least one type")]
    LastType(crate::domain::FollowUpType),
}

/// Checks that a required text field holds something other than whitespace.
pub(crate) fn required(field: &'static str, value: String) -> Result<NonEmptyString, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    NonEmptyString::new(value).map_err(|_| ValidationError::Missing(field))
}

pub(crate) const fn check_counts(answered: u32, total: u32) -> Result<(), ValidationError> {
    if answered > total {
        return Err(ValidationError::AnsweredExceedsTotal { answered, total });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_missing() {
        assert_eq!(
            required("title", "   ".to_string()).unwrap_err(),
            ValidationError::Missing("title")
        );
        assert_eq!(
            required("title", String::new()).unwrap_err(),
            ValidationError::Missing("title")
        );
    }

    #[test]
    fn present_fields_are_kept_verbatim() {
        let value = required("title", " Trade Review ".to_string()).unwrap();
        assert_eq!(value.as_str(), " Trade Review ");
    }

    #[test]
    fn answered_cannot_exceed_total() {
        assert!(check_counts(10, 10).is_ok());
        assert_eq!(
            check_counts(11, 10).unwrap_err().to_string(),
            "answered questions (11) cannot exceed total questions (10)"
        );
    }
}
