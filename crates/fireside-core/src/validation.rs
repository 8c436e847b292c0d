//! Record validation, run before any storage interaction

use thiserror::Error;

use crate::types::tag::{TagRequest, TagTarget, MAX_WEIGHT, MIN_WEIGHT};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Tag name must not be empty")]
    EmptyTagName,

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
}

/// Collects the names of required fields that are blank.
///
/// ```rust,ignore
/// let mut missing = Missing::default();
/// missing.check("name", &snippet.name);
/// missing.finish()?;
/// ```
#[derive(Debug, Default)]
pub struct Missing(Vec<&'static str>);

impl Missing {
    /// Record `field` as missing when `value` is empty or whitespace
    pub fn check(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.0.push(field);
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingFields(std::mem::take(&mut self.0)))
        }
    }
}

/// Reject NaN and infinities, which JSON cannot represent
pub fn check_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NotFinite { field })
    }
}

/// Validate a submitted tag batch: weights in range, no blank names
pub fn validate_tag_requests(requests: &[TagRequest]) -> Result<(), ValidationError> {
    for request in requests {
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&request.weight) {
            return Err(ValidationError::OutOfRange {
                field: "weight",
                value: i64::from(request.weight),
                min: i64::from(MIN_WEIGHT),
                max: i64::from(MAX_WEIGHT),
            });
        }
        match &request.target {
            TagTarget::Named(name) if name.trim().is_empty() => {
                return Err(ValidationError::EmptyTagName)
            }
            TagTarget::Existing(id) if id.as_str().trim().is_empty() => {
                return Err(ValidationError::EmptyTagName)
            }
            _ => {}
        }
    }
    Ok(())
}
