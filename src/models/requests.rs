use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::FleetContext;

/// Request to the AI dispatch relay
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DispatchRequest {
    #[validate(custom(function = "not_blank"))]
    #[serde(rename = "userQuery")]
    pub user_query: String,
    #[validate(nested)]
    #[serde(default)]
    pub context: FleetContext,
}

/// Request to format a model answer into display blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatRequest {
    pub text: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("userQuery must not be empty".into());
        return Err(err);
    }
    Ok(())
}
