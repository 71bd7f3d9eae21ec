//! Settings mapper: UI fields <-> provider wire settings.
//!
//! Pure functions; nothing here touches the network or session state. Two
//! provider classes exist:
//!
//! - ratio-native: a free aspect ratio is emitted as
//!   `image_config.aspect_ratio`, with `image_config` omitted entirely when
//!   the field is empty;
//! - size-table: the (aspect, resolution) pair is looked up in a static
//!   table and emitted as `output.size`; a miss emits no `size` field.
//!
//! Round-trip law: `hydrate(collect(p, a, r)) == (a, r)` for every (a, r)
//! key present in the provider's table.

mod sizes;

use serde::{Deserialize, Serialize};

/// Provider-specific settings object. Always carries `prompt`; the output
/// sub-objects are produced here and never hand-constructed elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPayload {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
}

/// Aspect/resolution values restored from a persisted slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputFields {
    pub aspect_ratio: String,
    pub resolution: String,
}

/// Assemble the settings payload for a provider from the UI field values.
pub fn collect_settings(
    provider: &str,
    prompt: &str,
    aspect_ratio: &str,
    resolution: &str,
) -> SettingsPayload {
    let mut settings = SettingsPayload {
        prompt: prompt.trim().to_string(),
        ..Default::default()
    };

    let aspect_ratio = aspect_ratio.trim();
    let resolution = resolution.trim();

    match provider {
        "gemini" => {
            settings.output = Some(OutputSettings {
                mime_type: Some("image/png".to_string()),
                ..Default::default()
            });
            if !aspect_ratio.is_empty() {
                settings.image_config = Some(ImageConfig {
                    aspect_ratio: Some(aspect_ratio.to_string()),
                    image_size: None,
                });
            }
        }
        "gemini-3-pro" => {
            settings.output = Some(OutputSettings {
                mime_type: Some("image/png".to_string()),
                size: sizes::lookup(sizes::GEMINI_3_PRO_SIZES, aspect_ratio, resolution)
                    .map(str::to_string),
                ..Default::default()
            });
        }
        "gpt-image-1.5" => {
            settings.output = Some(OutputSettings {
                format: Some("png".to_string()),
                size: sizes::lookup(sizes::GPT_IMAGE_SIZES, aspect_ratio, resolution)
                    .map(str::to_string),
                ..Default::default()
            });
        }
        _ => {}
    }

    settings
}

/// Inverse mapping: restore the aspect-ratio/resolution fields from a
/// persisted slot's settings. Prefers the `image_config` pair when present,
/// otherwise reverse-looks-up a stored `output.size`.
pub fn hydrate_output_fields(provider: &str, settings: &SettingsPayload) -> OutputFields {
    if let Some(config) = &settings.image_config {
        if let Some(aspect) = config.aspect_ratio.as_deref().filter(|a| !a.is_empty()) {
            let resolution = match provider {
                // Single-tier provider: resolution stays untouched.
                "gemini" => String::new(),
                _ => config.image_size.clone().unwrap_or_default(),
            };
            return OutputFields {
                aspect_ratio: aspect.to_string(),
                resolution,
            };
        }
    }

    let stored = settings
        .output
        .as_ref()
        .and_then(|output| output.size.as_deref());
    let Some(stored) = stored else {
        return OutputFields::default();
    };

    let table = match provider {
        "gemini-3-pro" => sizes::GEMINI_3_PRO_SIZES,
        "gpt-image-1.5" => sizes::GPT_IMAGE_SIZES,
        _ => return OutputFields::default(),
    };

    match sizes::reverse(table, stored) {
        Some((aspect, resolution)) => OutputFields {
            aspect_ratio: aspect.to_string(),
            resolution: resolution.to_string(),
        },
        None => OutputFields::default(),
    }
}

/// UI control a server validation issue can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Title,
    Provider,
    Operation,
    Prompt,
    AspectRatio,
    Resolution,
    TemplateMedia,
    TestImage,
}

/// Map a dotted field path from a 422 response to its UI control. Paths the
/// table does not know fall back to the generic failure banner.
pub fn control_for_path(path: &str) -> Option<Control> {
    // Test-run issues come back under a `slot_payload.` prefix.
    let path = path.strip_prefix("slot_payload.").unwrap_or(path);
    match path {
        "display_name" => Some(Control::Title),
        "provider" => Some(Control::Provider),
        "operation" => Some(Control::Operation),
        "settings.prompt" => Some(Control::Prompt),
        "settings.image_config.aspect_ratio" => Some(Control::AspectRatio),
        "settings.image_config.image_size" => Some(Control::Resolution),
        "settings.output.size" => Some(Control::Resolution),
        "template_media" | "template_media.0.media_object_id" => Some(Control::TemplateMedia),
        _ => None,
    }
}
