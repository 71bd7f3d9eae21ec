use thiserror::Error;

use super::models::Config;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("slot.id must not be empty")]
    EmptySlotId,

    #[error("slot.upload_limit must be greater than zero")]
    ZeroUploadLimit,

    #[error("slot.sync_response_seconds must be greater than zero")]
    ZeroSyncTimeout,

    #[error("{field} must be an http(s) URL, got: {value}")]
    InvalidEndpoint { field: &'static str, value: String },
}

pub fn validate(config: &Config) -> Result<(), ValidationError> {
    if config.slot.id.trim().is_empty() {
        return Err(ValidationError::EmptySlotId);
    }
    if config.slot.upload_limit.as_u64() == 0 {
        return Err(ValidationError::ZeroUploadLimit);
    }
    if config.slot.sync_response_seconds == 0 {
        return Err(ValidationError::ZeroSyncTimeout);
    }

    // Endpoints may be left unset; a workflow that needs one reports the
    // missing endpoint at call time.
    let endpoints = [
        ("service.slot_api", &config.service.slot_api),
        ("service.slot_save", &config.service.slot_save),
        ("service.template_upload", &config.service.template_upload),
        ("service.test_run", &config.service.test_run),
        ("service.ingest_base", &config.service.ingest_base),
    ];
    for (field, value) in endpoints {
        if !value.is_empty()
            && !value.starts_with("http://")
            && !value.starts_with("https://")
        {
            return Err(ValidationError::InvalidEndpoint {
                field,
                value: value.clone(),
            });
        }
    }

    Ok(())
}
