use serde::{Deserialize, Serialize};

use crate::humanize::ByteSize;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub slot: SlotConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Endpoints of the slot service. `slot_save` falls back to `slot_api`
/// when left empty.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub slot_api: String,
    #[serde(default)]
    pub slot_save: String,
    #[serde(default)]
    pub template_upload: String,
    #[serde(default)]
    pub test_run: String,
    #[serde(default = "default_ingest_base")]
    pub ingest_base: String,
}

impl ServiceConfig {
    pub fn save_endpoint(&self) -> &str {
        if self.slot_save.is_empty() {
            &self.slot_api
        } else {
            &self.slot_save
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            slot_api: String::new(),
            slot_save: String::new(),
            template_upload: String::new(),
            test_run: String::new(),
            ingest_base: default_ingest_base(),
        }
    }
}

fn default_ingest_base() -> String {
    "https://api.example.com/ingest/".to_string()
}

/// Slot identity and the numeric knobs forwarded in the save payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SlotConfig {
    #[serde(default = "default_slot_id")]
    pub id: String,
    /// Pre-selected provider slug, may be empty.
    #[serde(default)]
    pub provider: String,
    /// Pre-selected operation slug, may be empty.
    #[serde(default)]
    pub operation: String,
    #[serde(default = "default_upload_limit")]
    pub upload_limit: ByteSize,
    #[serde(default = "default_sync_response_seconds")]
    pub sync_response_seconds: u64,
}

impl SlotConfig {
    /// Upload limit in whole megabytes, as the save payload expects it.
    pub fn size_limit_mb(&self) -> u64 {
        self.upload_limit.as_mb()
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            id: default_slot_id(),
            provider: String::new(),
            operation: String::new(),
            upload_limit: default_upload_limit(),
            sync_response_seconds: default_sync_response_seconds(),
        }
    }
}

fn default_slot_id() -> String {
    "slot-000".to_string()
}

fn default_upload_limit() -> ByteSize {
    ByteSize::from_mb(15)
}

fn default_sync_response_seconds() -> u64 {
    48
}

/// HTTP client knobs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("slotbox/{}", env!("CARGO_PKG_VERSION"))
}
