//! Toolkit: assemble adapters from a tool catalog.

use crate::adapter::{ToolAdapter, ToolInvoker};
use crate::contracts::{ToolDefinition, ToolSelectionOptions};
use crate::error::{Result, ToolkitError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The external source of tool definitions.
#[async_trait]
pub trait ToolCatalog: Send + Sync {
    /// All tools exposed by one integration (e.g. `github`, `slack`).
    async fn list_tools(&self, integration: &str) -> Result<Vec<ToolDefinition>>;

    /// Tools selected semantically for a natural-language query.
    async fn select_tools(
        &self,
        query: &str,
        options: &ToolSelectionOptions,
    ) -> Result<Vec<ToolDefinition>>;
}

/// Toolkit configuration: exactly one tool source must be given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolkitConfig {
    /// Integrations to load tools from. Takes precedence over `tool_query`.
    #[serde(default)]
    pub integrations: Vec<String>,

    /// Semantic query for tool selection, used when `integrations` is empty.
    #[serde(default)]
    pub tool_query: Option<String>,
}

/// A lazily-initialized collection of [`ToolAdapter`]s drawn from a catalog.
///
/// The adapter list is built on first use and reused afterwards; [`Toolkit::refresh`]
/// rebuilds it when tool availability changes.
pub struct Toolkit {
    config: ToolkitConfig,
    catalog: Arc<dyn ToolCatalog>,
    invoker: Arc<dyn ToolInvoker>,
    tools: RwLock<Option<Vec<Arc<ToolAdapter>>>>,
}

impl Toolkit {
    #[must_use]
    pub fn new(
        config: ToolkitConfig,
        catalog: Arc<dyn ToolCatalog>,
        invoker: Arc<dyn ToolInvoker>,
    ) -> Self {
        Self {
            config,
            catalog,
            invoker,
            tools: RwLock::new(None),
        }
    }

    /// All tools, initializing from the configured source on first call.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration names no tool source, or if the
    /// catalog or adapter construction fails.
    pub async fn tools(&self) -> Result<Vec<Arc<ToolAdapter>>> {
        if let Some(tools) = self.tools.read().await.as_ref() {
            return Ok(tools.clone());
        }

        let mut slot = self.tools.write().await;
        // Another caller may have initialized while we waited for the lock.
        if let Some(tools) = slot.as_ref() {
            return Ok(tools.clone());
        }

        let tools = self.load_tools().await?;
        *slot = Some(tools.clone());
        Ok(tools)
    }

    /// Drop the cached adapter list and rebuild it from the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if reloading fails; the previous list is discarded
    /// either way.
    pub async fn refresh(&self) -> Result<()> {
        let mut slot = self.tools.write().await;
        *slot = None;
        let tools = self.load_tools().await?;
        *slot = Some(tools);
        Ok(())
    }

    /// Adapters for every tool of one integration (bypasses the cached list).
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog lookup or adapter construction fails.
    pub async fn tools_from_integration(&self, integration: &str) -> Result<Vec<Arc<ToolAdapter>>> {
        let defs = self.catalog.list_tools(integration).await?;
        self.build_adapters(defs, Some(integration))
    }

    /// Adapters for tools selected semantically (bypasses the cached list).
    ///
    /// # Errors
    ///
    /// Returns an error if selection or adapter construction fails.
    pub async fn tools_from_query(
        &self,
        query: &str,
        options: &ToolSelectionOptions,
    ) -> Result<Vec<Arc<ToolAdapter>>> {
        let defs = self.catalog.select_tools(query, options).await?;
        self.build_adapters(defs, None)
    }

    /// Adapters for one category, via selection with a widened tool budget.
    ///
    /// # Errors
    ///
    /// Returns an error if selection or adapter construction fails.
    pub async fn tools_by_category(&self, category: &str) -> Result<Vec<Arc<ToolAdapter>>> {
        let options = ToolSelectionOptions {
            categories: vec![category.to_string()],
            max_tools: 50,
            ..ToolSelectionOptions::default()
        };
        self.tools_from_query("", &options).await
    }

    /// Tools whose exposed name matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if initialization fails.
    pub async fn filter_tools_by_name(&self, pattern: &Regex) -> Result<Vec<Arc<ToolAdapter>>> {
        let tools = self.tools().await?;
        Ok(tools
            .into_iter()
            .filter(|t| pattern.is_match(t.name()))
            .collect())
    }

    /// Summary of the toolkit's configuration and loaded tools.
    pub async fn metadata(&self) -> Value {
        let tools = self.tools.read().await;
        let loaded = tools.as_ref();
        json!({
            "toolCount": loaded.map_or(0, Vec::len),
            "integrations": self.config.integrations,
            "toolQuery": self.config.tool_query,
            "initialized": loaded.is_some(),
            "tools": loaded
                .map(|ts| ts.iter().map(|t| t.metadata()).collect::<Vec<_>>())
                .unwrap_or_default(),
        })
    }

    async fn load_tools(&self) -> Result<Vec<Arc<ToolAdapter>>> {
        let tools = if !self.config.integrations.is_empty() {
            let mut all = Vec::new();
            for integration in &self.config.integrations {
                all.extend(self.tools_from_integration(integration).await?);
            }
            all
        } else if let Some(query) = &self.config.tool_query {
            self.tools_from_query(query, &ToolSelectionOptions::default())
                .await?
        } else {
            return Err(ToolkitError::Config(
                "Toolkit requires either 'integrations' or 'toolQuery'".to_string(),
            ));
        };

        tracing::info!(tools = tools.len(), "initialized toolkit");
        Ok(tools)
    }

    fn build_adapters(
        &self,
        defs: Vec<ToolDefinition>,
        integration: Option<&str>,
    ) -> Result<Vec<Arc<ToolAdapter>>> {
        defs.into_iter()
            .map(|mut def| {
                // Catalog listings scoped to an integration may omit the label
                // on each entry; stamp it in.
                if def.integration.is_none()
                    && let Some(integration) = integration
                {
                    def.integration = Some(integration.to_string());
                }
                Ok(Arc::new(ToolAdapter::from_definition(
                    &def,
                    Arc::clone(&self.invoker),
                )?))
            })
            .collect()
    }
}
