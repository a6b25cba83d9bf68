use oceanchat_api::{ModelCatalog, ModelEntry};

/// The client's record of selectable models and the single active selection.
///
/// Selection is a nullable name rather than per-entry flags, so "at most one
/// selected" holds by construction. The wire `selected` flags only seed the
/// field when a catalog is applied.
#[derive(Debug)]
pub struct ModelRegistry {
    provider: String,
    healthy: bool,
    models: Vec<ModelEntry>,
    selected: Option<String>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            provider: String::new(),
            healthy: true,
            models: Vec::new(),
            selected: None,
        }
    }

    /// Install a freshly fetched catalog, seeding the selection from the
    /// first entry the backend marked selected.
    pub fn apply_catalog(&mut self, catalog: ModelCatalog) {
        self.selected = catalog
            .models
            .iter()
            .find(|m| m.selected)
            .map(|m| m.name.clone());
        self.provider = catalog.provider;
        self.healthy = catalog.healthy;
        self.models = catalog.models;
    }

    /// Degraded state after a failed catalog fetch: no models, unhealthy.
    pub fn mark_unavailable(&mut self) {
        self.healthy = false;
        self.models.clear();
        self.selected = None;
    }

    /// Select the model with exactly this name. A name not present in the
    /// catalog clears the selection instead of failing.
    pub fn select(&mut self, name: &str) {
        self.selected = self
            .models
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.name.clone());
    }

    pub fn current_selection(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn models(&self) -> &[ModelEntry] {
        &self.models
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn healthy(&self) -> bool {
        self.healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(selected: Option<usize>) -> ModelCatalog {
        let mut models = vec![
            ModelEntry {
                name: "gpt-x".into(),
                provider: "openai".into(),
                status: "available".into(),
                selected: false,
            },
            ModelEntry {
                name: "claude-y".into(),
                provider: "anthropic".into(),
                status: "available".into(),
                selected: false,
            },
        ];
        if let Some(idx) = selected {
            models[idx].selected = true;
        }
        ModelCatalog {
            provider: "openai".into(),
            healthy: true,
            models,
        }
    }

    #[test]
    fn apply_catalog_seeds_selection_from_wire_flags() {
        let mut registry = ModelRegistry::new();
        registry.apply_catalog(catalog(Some(1)));
        assert_eq!(registry.current_selection(), Some("claude-y"));
        assert!(registry.healthy());
        assert_eq!(registry.provider(), "openai");
    }

    #[test]
    fn apply_catalog_without_flags_leaves_no_selection() {
        let mut registry = ModelRegistry::new();
        registry.apply_catalog(catalog(None));
        assert_eq!(registry.current_selection(), None);
    }

    #[test]
    fn select_matches_exact_name_only() {
        let mut registry = ModelRegistry::new();
        registry.apply_catalog(catalog(None));

        registry.select("gpt-x");
        assert_eq!(registry.current_selection(), Some("gpt-x"));

        // A near-miss clears the previous selection rather than keeping it.
        registry.select("gpt-X");
        assert_eq!(registry.current_selection(), None);
    }

    #[test]
    fn unknown_name_clears_selection() {
        let mut registry = ModelRegistry::new();
        registry.apply_catalog(catalog(Some(0)));
        registry.select("no-such-model");
        assert_eq!(registry.current_selection(), None);
    }

    #[test]
    fn mark_unavailable_empties_the_catalog() {
        let mut registry = ModelRegistry::new();
        registry.apply_catalog(catalog(Some(0)));
        registry.mark_unavailable();
        assert!(!registry.healthy());
        assert!(registry.models().is_empty());
        assert_eq!(registry.current_selection(), None);
    }
}
