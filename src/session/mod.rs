//! Slot session state: the in-memory model mutated by the workflows.
//!
//! Pure data plus derived views. Network reconciliation lives in
//! `workflow`; this module only encodes the local transition rules for
//! provider/operation selection and the header/ingest-URL projections.

use crate::media::{MediaBinding, TEMPLATE_MEDIA_KIND, TEST_MEDIA_KIND};
use crate::registry::{OperationPicker, ProviderRegistry, Requirements};

pub const HEADER_PLACEHOLDER: &str = "no provider selected";

/// Slot identity and confirmed metadata. Replaced wholesale by the server's
/// echoed slot after a successful save; the server is authoritative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotMeta {
    pub id: String,
    pub provider: String,
    pub operation: String,
    /// Display name of the configured model, empty until saved or hydrated.
    pub model_name: String,
}

/// Local draft of the editable fields, reconciled against server state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotDraft {
    pub title: String,
    pub prompt: String,
    pub aspect_ratio: String,
    pub resolution: String,
}

/// Derived UI-visibility flags for the current selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewFlags {
    pub show_operation_picker: bool,
    pub requirements: Option<Requirements>,
}

/// Outcome of a provider switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSelection {
    /// Provider applied; operation list regenerated, preferred operation
    /// auto-selected.
    Applied { operations: Vec<&'static str> },
    /// Empty or unknown slug: selection cleared.
    Cleared,
}

/// Outcome of an operation selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationSelection {
    Applied,
    /// The chosen operation is not yet supported; the session snapped back
    /// to the provider's preferred operation.
    SnappedBack { applied: String, warning: String },
    /// Unknown provider or operation; no state change.
    Ignored,
}

#[derive(Debug)]
pub struct SlotSession {
    pub meta: SlotMeta,
    pub draft: SlotDraft,
    pub template: MediaBinding,
    pub test_image: MediaBinding,
    pub view: ViewFlags,
}

impl SlotSession {
    pub fn new(slot_id: impl Into<String>) -> Self {
        Self {
            meta: SlotMeta {
                id: slot_id.into(),
                ..Default::default()
            },
            draft: SlotDraft::default(),
            template: MediaBinding::new(TEMPLATE_MEDIA_KIND),
            test_image: MediaBinding::new(TEST_MEDIA_KIND),
            view: ViewFlags::default(),
        }
    }

    /// Switch provider. Always clears the current operation, then
    /// regenerates the operation list; providers with a hidden picker get
    /// their preferred operation auto-selected, visible pickers are
    /// pre-seeded with the preferred operation as well.
    pub fn select_provider(
        &mut self,
        registry: &ProviderRegistry,
        slug: &str,
    ) -> ProviderSelection {
        self.meta.operation.clear();
        self.view = ViewFlags::default();

        let Ok(provider) = registry.get(slug) else {
            self.meta.provider.clear();
            self.meta.model_name.clear();
            return ProviderSelection::Cleared;
        };

        self.meta.provider = provider.slug.to_string();
        self.meta.model_name = provider.label.to_string();
        self.view.show_operation_picker = provider.picker == OperationPicker::Visible;

        let preferred = provider.preferred_operation.to_string();
        self.apply_operation(registry, &preferred);

        ProviderSelection::Applied {
            operations: provider.operation_slugs().collect(),
        }
    }

    /// Select an operation for the current provider. Unsupported operations
    /// snap back to the preferred one with a warning.
    pub fn select_operation(
        &mut self,
        registry: &ProviderRegistry,
        slug: &str,
    ) -> OperationSelection {
        let Ok(provider) = registry.get(&self.meta.provider) else {
            return OperationSelection::Ignored;
        };
        let Some(operation) = provider.operation(slug) else {
            return OperationSelection::Ignored;
        };

        if !operation.supported {
            let preferred = provider.preferred_operation.to_string();
            let warning = format!(
                "operation '{slug}' is not yet available for {}; using '{preferred}'",
                provider.label
            );
            tracing::warn!(provider = provider.slug, operation = slug, "{warning}");
            self.apply_operation(registry, &preferred);
            return OperationSelection::SnappedBack {
                applied: preferred,
                warning,
            };
        }

        self.apply_operation(registry, slug);
        OperationSelection::Applied
    }

    fn apply_operation(&mut self, registry: &ProviderRegistry, slug: &str) {
        self.meta.operation = slug.to_string();
        self.view.requirements = Some(registry.requirements(&self.meta.provider, slug));
    }

    /// "<model-name-or-provider-label> (<provider-slug>)", or the
    /// placeholder while no provider is selected.
    pub fn header_text(&self, registry: &ProviderRegistry) -> String {
        if self.meta.provider.is_empty() {
            return HEADER_PLACEHOLDER.to_string();
        }
        let display = if self.meta.model_name.is_empty() {
            registry.label(&self.meta.provider)
        } else {
            &self.meta.model_name
        };
        format!("{display} ({})", self.meta.provider)
    }

    /// Externally shared ingest endpoint: base + slot id, nothing else.
    /// Empty when either part is missing.
    pub fn ingest_url(&self, base: &str) -> String {
        ingest_url(&self.meta.id, base)
    }
}

/// Concatenate the ingest base and slot id. The provider slug is never part
/// of the URL; the upstream contract keys on the slot alone.
pub fn ingest_url(slot_id: &str, base: &str) -> String {
    if slot_id.is_empty() || base.is_empty() {
        return String::new();
    }
    format!("{}/{slot_id}", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (SlotSession, ProviderRegistry) {
        (SlotSession::new("slot-001"), ProviderRegistry::with_defaults())
    }

    #[test]
    fn provider_switch_regenerates_operations_and_clears_selection() {
        let (mut session, registry) = session();
        session.select_provider(&registry, "gemini");
        assert_eq!(session.meta.operation, "identity_transfer");

        let selection = session.select_provider(&registry, "turbotext");
        let ProviderSelection::Applied { operations } = selection else {
            panic!("expected Applied");
        };
        assert_eq!(
            operations,
            vec!["image2image", "style_transfer", "image_edit", "identity_transfer"]
        );
        // Previous selection is gone; preferred op is pre-seeded.
        assert_eq!(session.meta.operation, "image2image");
        assert!(session.view.show_operation_picker);
    }

    #[test]
    fn unknown_provider_clears_the_selection() {
        let (mut session, registry) = session();
        session.select_provider(&registry, "gemini");
        let selection = session.select_provider(&registry, "nope");
        assert_eq!(selection, ProviderSelection::Cleared);
        assert!(session.meta.provider.is_empty());
        assert!(session.meta.operation.is_empty());
        assert!(session.meta.model_name.is_empty());
    }

    #[test]
    fn hidden_picker_auto_selects_the_preferred_operation() {
        let (mut session, registry) = session();
        session.select_provider(&registry, "gemini-3-pro");
        assert_eq!(session.meta.operation, "image_edit");
        assert!(!session.view.show_operation_picker);
        let needs = session.view.requirements.unwrap();
        assert!(needs.prompt && needs.test_image && !needs.template_image);
    }

    #[test]
    fn unsupported_operation_snaps_back_with_a_warning() {
        let (mut session, registry) = session();
        session.select_provider(&registry, "turbotext");
        let selection = session.select_operation(&registry, "style_transfer");
        let OperationSelection::SnappedBack { applied, warning } = selection else {
            panic!("expected SnappedBack");
        };
        assert_eq!(applied, "image2image");
        assert!(warning.contains("not yet available"));
        assert_eq!(session.meta.operation, "image2image");
    }

    #[test]
    fn selecting_an_unknown_operation_is_ignored() {
        let (mut session, registry) = session();
        session.select_provider(&registry, "gemini");
        assert_eq!(
            session.select_operation(&registry, "does_not_exist"),
            OperationSelection::Ignored
        );
        assert_eq!(session.meta.operation, "identity_transfer");
    }

    #[test]
    fn header_text_prefers_the_model_name() {
        let (mut session, registry) = session();
        assert_eq!(session.header_text(&registry), HEADER_PLACEHOLDER);

        session.select_provider(&registry, "gemini");
        assert_eq!(session.header_text(&registry), "Gemini (gemini)");

        session.meta.model_name = "Portrait restyler".to_string();
        assert_eq!(
            session.header_text(&registry),
            "Portrait restyler (gemini)"
        );
    }

    #[test]
    fn ingest_url_is_base_plus_slot_id_only() {
        assert_eq!(
            ingest_url("slot-001", "https://api.example.com/ingest/"),
            "https://api.example.com/ingest/slot-001"
        );
        assert_eq!(
            ingest_url("slot-001", "https://api.example.com/ingest"),
            "https://api.example.com/ingest/slot-001"
        );
        assert_eq!(ingest_url("", "https://api.example.com/ingest"), "");
        assert_eq!(ingest_url("slot-001", ""), "");
    }
}
