//! Provider registry: upstream backends and the operations each supports.
//!
//! The registry is read-only and defined at process start. Unknown
//! identifiers are tolerated (the catalog may lag server-side capability
//! changes), so requirement lookups fall back to a safe default instead of
//! erroring.

mod builtin;

use thiserror::Error;

/// Input requirements of a single provider operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    /// A non-empty text prompt must be supplied.
    pub prompt: bool,
    /// A reusable template reference image must be bound.
    pub template_image: bool,
    /// A disposable test image is needed for test runs.
    pub test_image: bool,
}

impl Default for Requirements {
    fn default() -> Self {
        // Fallback for (provider, operation) pairs the catalog does not know.
        Self {
            prompt: true,
            template_image: false,
            test_image: true,
        }
    }
}

/// One provider capability with its display label and requirements.
#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub label: &'static str,
    pub needs: Requirements,
    /// Advertised but rejected on selection; the session snaps back to the
    /// provider's preferred operation.
    pub supported: bool,
}

/// Whether the operator gets to pick an operation for this provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPicker {
    /// The preferred operation is auto-selected and the picker is hidden.
    Hidden,
    /// Multiple operations are shown; unsupported ones snap back.
    Visible,
}

/// Immutable description of one upstream provider.
#[derive(Debug, Clone)]
pub struct ProviderSpec {
    pub slug: &'static str,
    pub label: &'static str,
    /// Operations in display order.
    operations: Vec<(&'static str, OperationSpec)>,
    pub preferred_operation: &'static str,
    pub picker: OperationPicker,
}

impl ProviderSpec {
    pub fn operation(&self, slug: &str) -> Option<&OperationSpec> {
        self.operations
            .iter()
            .find(|(key, _)| *key == slug)
            .map(|(_, spec)| spec)
    }

    pub fn operation_slugs(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.operations.iter().map(|(key, _)| *key)
    }

    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &OperationSpec)> + '_ {
        self.operations.iter().map(|(key, spec)| (*key, spec))
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// Registry mapping provider slugs to their specs.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<ProviderSpec>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<ProviderSpec>) -> Self {
        Self { providers }
    }

    /// Create the registry with the built-in provider catalog.
    pub fn with_defaults() -> Self {
        Self::new(builtin::catalog())
    }

    pub fn get(&self, slug: &str) -> Result<&ProviderSpec, RegistryError> {
        self.providers
            .iter()
            .find(|p| p.slug == slug)
            .ok_or_else(|| RegistryError::UnknownProvider(slug.to_string()))
    }

    pub fn has_provider(&self, slug: &str) -> bool {
        self.providers.iter().any(|p| p.slug == slug)
    }

    pub fn providers(&self) -> impl Iterator<Item = &ProviderSpec> {
        self.providers.iter()
    }

    /// Display label for a provider slug, falling back to the slug itself.
    pub fn label<'a>(&self, slug: &'a str) -> &'a str {
        self.get(slug).map(|p| p.label).unwrap_or(slug)
    }

    /// Requirement triple for a (provider, operation) pair, with the safe
    /// default when either identifier is unknown.
    pub fn requirements(&self, provider: &str, operation: &str) -> Requirements {
        self.get(provider)
            .ok()
            .and_then(|p| p.operation(operation))
            .map(|op| op.needs)
            .unwrap_or_default()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
