//! In-process module source backed by a map (fixtures, demos, tests)

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::Result;
use crate::{check_module_id, ModuleSource};

#[derive(Default)]
pub struct InMemoryModuleSource {
    modules: RwLock<HashMap<String, String>>,
}

impl InMemoryModuleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(self, module_id: impl Into<String>, xml: impl Into<String>) -> Self {
        self.insert(module_id, xml);
        self
    }

    pub fn insert(&self, module_id: impl Into<String>, xml: impl Into<String>) {
        let mut modules = self.modules.write().unwrap_or_else(|e| e.into_inner());
        modules.insert(module_id.into(), xml.into());
    }
}

#[async_trait]
impl ModuleSource for InMemoryModuleSource {
    async fn fetch_module(&self, module_id: &str, _requester: &str) -> Result<Option<String>> {
        let module_id = check_module_id(module_id)?;
        let modules = self.modules.read().unwrap_or_else(|e| e.into_inner());
        Ok(modules.get(module_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_none_for_unknown_modules() {
        let source = InMemoryModuleSource::new().with_module("a", "<ReportingModule/>");
        assert_eq!(
            source.fetch_module("a", "me").await.unwrap().as_deref(),
            Some("<ReportingModule/>")
        );
        assert!(source.fetch_module("b", "me").await.unwrap().is_none());
    }
}
