//! Wire models for the slot service API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mapping::SettingsPayload;

/// One template media binding referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateMediaBinding {
    pub media_kind: String,
    pub media_object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

/// Payload submitted via `PUT` to persist the slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotPayload {
    pub slot_id: String,
    pub display_name: String,
    pub provider: String,
    pub operation: String,
    pub is_active: bool,
    pub size_limit_mb: u64,
    pub sync_response_seconds: u64,
    pub settings: SettingsPayload,
    pub template_media: Vec<TemplateMediaBinding>,
}

/// JSON half of the multipart test-run request; the raw test image travels
/// alongside it as a file part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRunPayload {
    pub provider: String,
    pub operation: String,
    pub settings: SettingsPayload,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub template_media: Vec<TemplateMediaBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// One processing result surfaced in the slot's recent-results list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub result_expires_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub mime: Option<String>,
}

/// Server representation of a slot, returned by GET and echoed after a
/// successful save.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SlotDetails {
    #[serde(default)]
    pub slot_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub settings: SettingsPayload,
    #[serde(default)]
    pub template_media: Vec<TemplateMediaBinding>,
    #[serde(default)]
    pub recent_results: Vec<ResultEntry>,
    #[serde(default)]
    pub latest_result: Option<ResultEntry>,
}

impl SlotDetails {
    /// Parse a slot representation, unwrapping an optional `{"slot": ...}`
    /// envelope some endpoints use.
    pub fn from_payload(payload: Value) -> Option<Self> {
        let inner = match payload {
            Value::Object(mut map) => match map.remove("slot") {
                Some(slot @ Value::Object(_)) => slot,
                _ => Value::Object(map),
            },
            _ => return None,
        };
        serde_json::from_value(inner).ok()
    }

    /// Most recent processing result: the explicit `latest_result` when the
    /// server sends one, otherwise the head of `recent_results`.
    pub fn latest_result(&self) -> Option<&ResultEntry> {
        self.latest_result
            .as_ref()
            .or_else(|| self.recent_results.first())
    }
}

/// Response of the template-registration endpoint. Older service builds
/// returned the id under `id` instead of `media_object_id`.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaRegistered {
    #[serde(default)]
    pub media_object_id: String,
    #[serde(default)]
    pub id: String,
}

impl MediaRegistered {
    pub fn into_id(self) -> String {
        if self.media_object_id.is_empty() {
            self.id
        } else {
            self.media_object_id
        }
    }
}
