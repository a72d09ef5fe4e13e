use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::compile::CompiledTemplate;
use crate::TmplError;

/// Compiled templates keyed by their exact text.
#[derive(Default)]
pub struct TemplateCache {
    entries: RwLock<HashMap<String, Arc<CompiledTemplate>>>,
    compiles: AtomicUsize,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached template or compiles and inserts it. Each text is
    /// compiled at most once; failures are returned and never cached.
    pub fn get_or_compile(
        &self,
        template: &str,
        compile: impl FnOnce(&str) -> Result<CompiledTemplate, TmplError>,
    ) -> Result<Arc<CompiledTemplate>, TmplError> {
        if let Some(hit) = self.get(template) {
            tracing::trace!(template, "template cache hit");
            return Ok(hit);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have compiled it while we waited for the lock.
        if let Some(hit) = entries.get(template) {
            return Ok(Arc::clone(hit));
        }
        let compiled = Arc::new(compile(template)?);
        self.compiles.fetch_add(1, Ordering::Relaxed);
        entries.insert(template.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn get(&self, template: &str) -> Option<Arc<CompiledTemplate>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(template).cloned()
    }

    /// Number of successful compilations since creation.
    pub fn compile_count(&self) -> usize {
        self.compiles.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let dropped = entries.len();
        entries.clear();
        tracing::debug!(dropped, "template cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
