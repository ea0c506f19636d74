//! Request DTOs for commands
//!
//! Command input that needs more than a closed-set lookup implements `Validate`.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

// ============================================================================
// Application Requests
// ============================================================================

/// Answers given to `/apply`
///
/// Serialized with the field names recruiters see in the applications channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    #[validate(length(min = 1, max = 64, message = "Name must be 1-64 characters"))]
    pub name: String,

    #[validate(range(min = 13, max = 120, message = "Age must be between 13 and 120"))]
    pub age: i64,

    #[validate(length(min = 1, max = 64, message = "Country must be 1-64 characters"))]
    pub country: String,

    pub used_ace: bool,
    pub used_acre_or_tfar: bool,
    pub returning_member: bool,
}

impl ApplicationForm {
    /// Indented JSON for the applications channel
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One line per failed field, ordered by field name
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => format!("{message}."),
                None => format!("Invalid value for {field}."),
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}
