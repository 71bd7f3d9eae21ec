//! Save and test-run workflows.
//!
//! A workflow validates the session locally before anything touches the
//! network, resolves pending media bindings by uploading them, submits the
//! request, and reconciles the session against the server's echoed slot.
//! The server response is authoritative: confirmed metadata is replaced
//! wholesale after a successful save.

pub mod issues;

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::models::{SlotDetails, SlotPayload, TemplateMediaBinding, TestRunPayload};
use crate::client::{ClientError, SlotClient};
use crate::config::{Config, SlotConfig};
use crate::mapping::{Control, collect_settings, control_for_path, hydrate_output_fields};
use crate::media::{Resolution, UploadError};
use crate::observability::Metrics;
use crate::registry::{ProviderRegistry, Requirements};
use crate::session::SlotSession;
use issues::ValidationIssue;

/// A server-reported validation issue mapped back onto a UI control. Issues
/// whose path matches no known control keep `control: None` and surface in
/// the generic banner.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub control: Option<Control>,
    pub issue: ValidationIssue,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Rejected before any network call.
    #[error("{message}")]
    Local { control: Control, message: String },

    /// The service rejected the payload; issues are attributed per control.
    #[error("the service rejected {} field(s)", .0.len())]
    Fields(Vec<FieldError>),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("authentication required")]
    AuthRequired,

    #[error("request failed: {0}")]
    Transport(String),
}

impl From<ClientError> for WorkflowError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::AuthRequired => WorkflowError::AuthRequired,
            ClientError::Validation(issues) => WorkflowError::Fields(attribute(issues)),
            other => WorkflowError::Transport(other.to_string()),
        }
    }
}

fn attribute(issues: Vec<ValidationIssue>) -> Vec<FieldError> {
    issues
        .into_iter()
        .map(|issue| FieldError {
            control: control_for_path(&issue.field_path),
            issue,
        })
        .collect()
}

/// Drives the slot lifecycle: bootstrap, edit (through [`SlotSession`]),
/// save, test run.
pub struct SlotWorkflow {
    pub session: SlotSession,
    registry: ProviderRegistry,
    client: SlotClient,
    slot: SlotConfig,
    metrics: Arc<Metrics>,
}

impl SlotWorkflow {
    pub fn new(config: &Config, client: SlotClient, metrics: Arc<Metrics>) -> Self {
        let registry = ProviderRegistry::with_defaults();
        let mut session = SlotSession::new(config.slot.id.clone());
        if !config.slot.provider.is_empty() {
            session.select_provider(&registry, &config.slot.provider);
            if !config.slot.operation.is_empty() {
                session.select_operation(&registry, &config.slot.operation);
            }
        }
        Self {
            session,
            registry,
            client,
            slot: config.slot.clone(),
            metrics,
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Fetch the persisted slot, hydrate the session from it, and return
    /// the server representation for display.
    pub async fn bootstrap(&mut self) -> Result<SlotDetails, WorkflowError> {
        let details = self.client.fetch_slot().await?;
        self.apply_server_slot(details.clone());
        Ok(details)
    }

    /// Validate locally, upload a pending template if any, persist the slot,
    /// and reconcile against the server's echo.
    pub async fn save(&mut self) -> Result<SlotDetails, WorkflowError> {
        let needs = self.validate_selection()?;
        if self.session.draft.title.trim().is_empty() {
            return Err(local(Control::Title, "display name must not be empty"));
        }
        self.require_inputs(&needs)?;

        let template_media = self.resolve_template().await?;
        let payload = SlotPayload {
            slot_id: self.session.meta.id.clone(),
            display_name: self.session.draft.title.trim().to_string(),
            provider: self.session.meta.provider.clone(),
            operation: self.session.meta.operation.clone(),
            is_active: true,
            size_limit_mb: self.slot.size_limit_mb(),
            sync_response_seconds: self.slot.sync_response_seconds,
            settings: self.draft_settings(),
            template_media,
        };

        match self.client.save_slot(&payload).await {
            Ok(details) => {
                info!(slot_id = %payload.slot_id, provider = %payload.provider, "Slot saved");
                self.metrics.save_completed();
                self.apply_server_slot(details.clone());
                Ok(details)
            }
            Err(err) => {
                warn!(slot_id = %payload.slot_id, error = %err, "Slot save failed");
                self.metrics.save_rejected();
                Err(err.into())
            }
        }
    }

    /// Submit a one-off test run with the attached test image. Success does
    /// not change the confirmed slot metadata.
    pub async fn test_run(&mut self) -> Result<serde_json::Value, WorkflowError> {
        let needs = self.validate_selection()?;
        self.require_inputs(&needs)?;
        // The pending file stays attached; a test run does not consume it.
        let Some(test_image) = self.session.test_image.pending_file().cloned() else {
            return Err(local(Control::TestImage, "attach a test image first"));
        };

        let template_media = self.resolve_template().await?;
        let payload = TestRunPayload {
            provider: self.session.meta.provider.clone(),
            operation: self.session.meta.operation.clone(),
            settings: self.draft_settings(),
            template_media,
            display_name: match self.session.draft.title.trim() {
                "" => None,
                title => Some(title.to_string()),
            },
        };

        let ack = self.client.run_test(&payload, &test_image).await?;
        info!(provider = %payload.provider, operation = %payload.operation, "Test run submitted");
        self.metrics.test_run_submitted();
        Ok(ack)
    }

    /// Hydrate the session from the server's slot. Confirmed metadata and
    /// draft fields are replaced; a locally pending template file survives
    /// hydration.
    pub fn apply_server_slot(&mut self, details: SlotDetails) {
        if !details.slot_id.is_empty() {
            self.session.meta.id = details.slot_id;
        }
        if !details.provider.is_empty() {
            self.session.select_provider(&self.registry, &details.provider);
            if !details.operation.is_empty() {
                self.session.select_operation(&self.registry, &details.operation);
            }
        }

        // The configured display name doubles as the header's model name.
        if !details.display_name.is_empty() {
            self.session.meta.model_name = details.display_name.clone();
        }
        self.session.draft.title = details.display_name;
        self.session.draft.prompt = details.settings.prompt.clone();
        let output = hydrate_output_fields(&self.session.meta.provider, &details.settings);
        self.session.draft.aspect_ratio = output.aspect_ratio;
        self.session.draft.resolution = output.resolution;

        match details.template_media.first() {
            Some(binding) => {
                self.session.template.hydrate_bound(binding.media_object_id.clone());
            }
            None if self.session.template.pending_file().is_none() => {
                self.session.template.remove();
            }
            None => {}
        }
        debug!(slot_id = %self.session.meta.id, "Session hydrated from server slot");
    }

    fn draft_settings(&self) -> crate::mapping::SettingsPayload {
        collect_settings(
            &self.session.meta.provider,
            &self.session.draft.prompt,
            &self.session.draft.aspect_ratio,
            &self.session.draft.resolution,
        )
    }

    /// Check provider and operation are selected and resolvable, applying
    /// the preferred operation when none is picked yet. Returns the input
    /// requirements for the resolved pair.
    fn validate_selection(&mut self) -> Result<Requirements, WorkflowError> {
        let provider = self.session.meta.provider.clone();
        if provider.is_empty() {
            return Err(local(Control::Provider, "select a provider first"));
        }
        let Ok(spec) = self.registry.get(&provider) else {
            return Err(local(
                Control::Provider,
                format!("unknown provider '{provider}'"),
            ));
        };
        if self.session.meta.operation.is_empty() {
            let preferred = spec.preferred_operation.to_string();
            self.session.select_operation(&self.registry, &preferred);
        }
        let operation = self.session.meta.operation.clone();
        match spec.operation(&operation) {
            Some(op) if op.supported => {}
            _ => {
                return Err(local(
                    Control::Operation,
                    format!("operation '{operation}' is not available for '{provider}'"),
                ));
            }
        }
        Ok(self.registry.requirements(&provider, &operation))
    }

    fn require_inputs(&self, needs: &Requirements) -> Result<(), WorkflowError> {
        if needs.prompt && self.session.draft.prompt.trim().is_empty() {
            return Err(local(Control::Prompt, "prompt must not be empty"));
        }
        if needs.template_image && !self.session.template.is_present() {
            return Err(local(
                Control::TemplateMedia,
                "this operation requires a template image",
            ));
        }
        Ok(())
    }

    /// Upload the pending template file if any and return the binding list
    /// for the payload. Upload failure keeps the file pending for a retry.
    async fn resolve_template(&mut self) -> Result<Vec<TemplateMediaBinding>, WorkflowError> {
        let slot_id = self.session.meta.id.clone();
        let uploading = self.session.template.pending_file().is_some();
        let resolution = self
            .session
            .template
            .resolve_for_submit(&slot_id, &self.client)
            .await?;
        match resolution {
            Resolution::Bound(media_object_id) => {
                if uploading {
                    self.metrics.upload_completed();
                }
                Ok(vec![TemplateMediaBinding {
                    media_kind: self.session.template.kind().to_string(),
                    media_object_id,
                    preview_url: None,
                }])
            }
            Resolution::NoBinding => Ok(Vec::new()),
        }
    }
}

fn local(control: Control, message: impl Into<String>) -> WorkflowError {
    WorkflowError::Local {
        control,
        message: message.into(),
    }
}
