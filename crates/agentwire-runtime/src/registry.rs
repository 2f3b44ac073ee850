//! Workflow registry.
//!
//! Two tables: the catalog maps a normalized locator to a factory and is
//! populated in code at startup; the locator mapping (from configuration)
//! maps an agent name to a locator. Resolving a name goes through both.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use agentwire_checkpoint::CheckpointerHandle;
use agentwire_config::{normalize_locator, WorkflowLocators, WorkflowsConfig};
use agentwire_protocols::{EngineError, ExecutionEngine};

use crate::error::RegistryError;
use crate::workflows::echo;

/// Builds a ready-to-run engine bound to the shared checkpointer.
pub type WorkflowFactory =
    Arc<dyn Fn(CheckpointerHandle) -> Result<Arc<dyn ExecutionEngine>, EngineError> + Send + Sync>;

/// Locator to factory table.
pub struct WorkflowCatalog {
    factories: DashMap<String, WorkflowFactory>,
}

impl WorkflowCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// Catalog with the built-in workflows registered.
    pub fn with_builtins() -> Self {
        let catalog = Self::new();
        let registered = catalog.register(echo::ECHO_LOCATOR, |checkpointer| {
            Ok(Arc::new(echo::build_workflow(checkpointer)))
        });
        if let Err(e) = registered {
            warn!("Failed to register built-in workflow: {}", e);
        }
        catalog
    }

    /// Register a factory under a locator.
    pub fn register<F>(&self, locator: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(CheckpointerHandle) -> Result<Arc<dyn ExecutionEngine>, EngineError>
            + Send
            + Sync
            + 'static,
    {
        let key = normalize_locator(locator).ok_or_else(|| RegistryError::ConstructorLoad {
            locator: locator.to_string(),
            reason: "expected '<module>:<constructor>'".to_string(),
        })?;

        if self.factories.contains_key(&key) {
            return Err(RegistryError::DuplicateLocator(key));
        }

        debug!(locator = %key, "Registered workflow factory");
        self.factories.insert(key, Arc::new(factory));
        Ok(())
    }

    /// Look up a factory. The locator is normalized first.
    pub fn get(&self, locator: &str) -> Option<WorkflowFactory> {
        let key = normalize_locator(locator)?;
        self.factories.get(&key).map(|f| f.clone())
    }

    /// Registered locators, sorted.
    pub fn locators(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl Default for WorkflowCatalog {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// A name that resolved to a registered factory.
#[derive(Clone)]
pub struct ResolvedWorkflow {
    pub agent_name: String,
    pub locator: String,
    factory: WorkflowFactory,
}

impl ResolvedWorkflow {
    /// Construct the engine.
    pub fn construct(&self, checkpointer: CheckpointerHandle) -> Result<Arc<dyn ExecutionEngine>, RegistryError> {
        (self.factory)(checkpointer).map_err(|e| RegistryError::ConstructorLoad {
            locator: self.locator.clone(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Debug for ResolvedWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedWorkflow")
            .field("agent_name", &self.agent_name)
            .field("locator", &self.locator)
            .finish()
    }
}

/// Agent name to engine resolution.
pub struct WorkflowRegistry {
    locators: WorkflowLocators,
    catalog: WorkflowCatalog,
    resolved: DashMap<String, ResolvedWorkflow>,
}

impl WorkflowRegistry {
    pub fn new(locators: WorkflowLocators, catalog: WorkflowCatalog) -> Self {
        Self {
            locators,
            catalog,
            resolved: DashMap::new(),
        }
    }

    /// Load the locator mapping for a workflows section.
    ///
    /// `base` is the directory the locator file search starts from.
    pub fn from_config(
        config: &WorkflowsConfig,
        base: &Path,
        catalog: WorkflowCatalog,
    ) -> Result<Self, RegistryError> {
        let locators = WorkflowLocators::resolve(config, base)?;
        info!(
            agents = locators.len(),
            factories = catalog.len(),
            "Workflow registry loaded"
        );
        Ok(Self::new(locators, catalog))
    }

    /// Resolve an agent name to its factory.
    pub fn resolve(&self, agent_name: &str) -> Result<ResolvedWorkflow, RegistryError> {
        if let Some(hit) = self.resolved.get(agent_name) {
            return Ok(hit.clone());
        }

        let raw = self
            .locators
            .get(agent_name)
            .ok_or_else(|| RegistryError::UnknownWorkflow(agent_name.to_string()))?;

        let locator = normalize_locator(raw).ok_or_else(|| RegistryError::ConstructorLoad {
            locator: raw.to_string(),
            reason: "expected '<module>:<constructor>'".to_string(),
        })?;

        let factory = self
            .catalog
            .get(&locator)
            .ok_or_else(|| RegistryError::ConstructorLoad {
                locator: locator.clone(),
                reason: "no workflow registered for this locator".to_string(),
            })?;

        let resolved = ResolvedWorkflow {
            agent_name: agent_name.to_string(),
            locator,
            factory,
        };
        self.resolved.insert(agent_name.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Resolve and construct in one step.
    pub fn build(
        &self,
        agent_name: &str,
        checkpointer: CheckpointerHandle,
    ) -> Result<Arc<dyn ExecutionEngine>, RegistryError> {
        self.resolve(agent_name)?.construct(checkpointer)
    }

    /// Configured agent names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.locators.names()
    }

    /// Raw locator configured for an agent.
    pub fn locator(&self, agent_name: &str) -> Option<&str> {
        self.locators.get(agent_name)
    }

    pub fn catalog(&self) -> &WorkflowCatalog {
        &self.catalog
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
