use crate::config::Config;
use crate::fetch::{ContentFetcher, DefaultFetcher};
use anyhow::{Context, Result};
use presync_bridge::Agent;
use presync_common::{ensure_dir, ErrorPolicy, FanOut};
use presync_integration::Integration;
use presync_loader::PackageLoader;
use presync_types::{AgentPresetPackage, PresyncError};
use std::sync::Arc;
use tracing::{debug, info};

/// Files written by one [`SyncService::apply`], per agent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub written: Vec<(Agent, usize)>,
}

impl ApplyReport {
    /// Files written for `agent`, `None` if the agent was not enabled
    pub fn for_agent(&self, agent: Agent) -> Option<usize> {
        self.written
            .iter()
            .find(|(a, _)| *a == agent)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.written.iter().map(|(_, count)| count).sum()
    }
}

/// Sync service - fetches, loads and writes every import of a workspace
pub struct SyncService {
    config: Config,
    loader: PackageLoader,
    fetcher: Arc<dyn ContentFetcher>,
}

impl SyncService {
    /// Create a sync service using the [`DefaultFetcher`]
    pub fn new(config: Config) -> Self {
        let fetcher = Arc::new(DefaultFetcher::new(config.workspace_root.clone()));
        Self::with_fetcher(config, fetcher)
    }

    /// Create a sync service with a custom fetcher
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn ContentFetcher>) -> Self {
        let loader = PackageLoader::new(config.cache.dir());
        Self {
            config,
            loader,
            fetcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn integrations(&self) -> Vec<Integration> {
        self.config
            .integrations
            .enabled_agents()
            .into_iter()
            .map(|agent| Integration::new(self.config.workspace_root.clone(), agent))
            .collect()
    }

    /// Fetch every import into the package cache
    async fn fetch_all(&self) -> Result<()> {
        let cache_dir = self.loader.cache_dir();
        ensure_dir(cache_dir)
            .with_context(|| format!("Failed to create cache {}", cache_dir.display()))?;

        let mut fetches: FanOut<(), PresyncError> = FanOut::new(ErrorPolicy::RunToCompletion);
        for (package, import) in &self.config.imports {
            let fetcher = Arc::clone(&self.fetcher);
            let package = package.clone();
            let source = import.source.clone();
            let destination = self.loader.checkout_dir(&package);
            fetches.spawn_blocking(move || fetcher.fetch(&package, &source, &destination));
        }

        debug!("Fetching {} import(s)", fetches.len());
        fetches.join().await.context("Failed to fetch imports")?;
        Ok(())
    }

    /// Load every import; any failure fails the whole set
    async fn load_all(&self) -> Result<Vec<AgentPresetPackage>> {
        let imports = Arc::new(self.config.imports.clone());
        let mut loads: FanOut<AgentPresetPackage, PresyncError> =
            FanOut::new(ErrorPolicy::RunToCompletion);
        for package in self.config.imports.keys() {
            let loader = self.loader.clone();
            let imports = Arc::clone(&imports);
            let package = package.clone();
            loads.spawn(async move { loader.load(&imports, &package).await });
        }

        loads.join().await.context("Failed to load imports")
    }

    /// Sync all imports into every enabled agent's workspace layout.
    ///
    /// Nothing is written unless every import fetched and loaded. Each
    /// agent's namespace is cleaned before the packages are written to it.
    pub async fn apply(&self) -> Result<ApplyReport> {
        info!(
            "Applying {} import(s) to namespace '{}'",
            self.config.imports.len(),
            self.config.namespace
        );

        self.fetch_all().await?;
        let packages = self.load_all().await?;

        let namespace = self.config.namespace.as_str();
        let mut report = ApplyReport::default();
        for integration in self.integrations() {
            let agent = integration.agent();
            integration
                .clean(namespace)
                .with_context(|| format!("Failed to clean {agent} namespace '{namespace}'"))?;

            let mut written = 0;
            for package in &packages {
                written += integration
                    .write_package(namespace, package)
                    .await
                    .with_context(|| {
                        format!("Failed to write package '{}' for {agent}", package.package_name)
                    })?;
            }
            info!("{}: {} file(s) written", agent, written);
            report.written.push((agent, written));
        }

        Ok(report)
    }

    /// Remove the namespace from every enabled agent's workspace layout
    pub fn clean(&self) -> Result<()> {
        let namespace = self.config.namespace.as_str();
        for integration in self.integrations() {
            integration.clean(namespace).with_context(|| {
                format!(
                    "Failed to clean {} namespace '{namespace}'",
                    integration.agent()
                )
            })?;
        }
        info!("Cleaned namespace '{}'", namespace);
        Ok(())
    }
}
