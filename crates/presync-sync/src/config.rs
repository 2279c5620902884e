use anyhow::Context;
use presync_bridge::Agent;
use presync_logging::LogFormat;
use presync_types::Import;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Namespace directory used when none is configured
pub const DEFAULT_NAMESPACE: &str = "presync";

/// Name, without extension, of global and workspace config files
const CONFIG_FILE_STEM: &str = "presync";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_workspace_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_level() -> String {
    "info".to_string()
}

fn enabled() -> bool {
    true
}

/// `~/.presync`, or `.presync` when there is no home directory
fn presync_home() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".presync"))
        .unwrap_or_else(|| PathBuf::from(".presync"))
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CacheConfig {
    /// Where packages are fetched to; `~/.presync/cache` when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl CacheConfig {
    pub fn dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| presync_home().join("cache"))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// Agents to write presets for; all of them unless switched off
#[derive(Debug, Deserialize, Clone)]
pub struct IntegrationsConfig {
    #[serde(default = "enabled")]
    pub cursor: bool,
    #[serde(default = "enabled")]
    pub github: bool,
    #[serde(default = "enabled")]
    pub windsurf: bool,
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            cursor: true,
            github: true,
            windsurf: true,
        }
    }
}

impl IntegrationsConfig {
    pub fn enabled_agents(&self) -> Vec<Agent> {
        Agent::ALL
            .into_iter()
            .filter(|agent| match agent {
                Agent::Cursor => self.cursor,
                Agent::Github => self.github,
                Agent::Windsurf => self.windsurf,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_workspace_root")]
    pub workspace_root: PathBuf,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub integrations: IntegrationsConfig,
    #[serde(default)]
    pub imports: BTreeMap<String, Import>,
}

impl Config {
    /// Get the global config path: ~/.presync/presync.toml
    pub fn global_config_path() -> PathBuf {
        presync_home().join(format!("{CONFIG_FILE_STEM}.toml"))
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.presync/presync.toml (optional)
    /// 2. Workspace config: ./presync.{toml,yaml,json} (optional)
    /// 3. Environment variables with the PRESYNC__ prefix (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            .add_source(config::File::from(Self::global_config_path()).required(false))
            .add_source(config::File::with_name(CONFIG_FILE_STEM).required(false))
            .add_source(config::Environment::with_prefix("PRESYNC").separator("__"));

        let config = builder.build().context("Failed to read configuration")?;
        let config: Self = config
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load a single config file, without global or environment layers
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .and_then(|c| c.try_deserialize())
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let components: Vec<Component> = Path::new(&self.namespace).components().collect();
        if !matches!(components.as_slice(), [Component::Normal(_)]) {
            anyhow::bail!(
                "namespace must be a single directory name, got '{}'",
                self.namespace
            );
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use presync_types::ImportDetails;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("presync.toml");
        fs::write(&path, "").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.workspace_root, PathBuf::from("."));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.integrations.enabled_agents(), Agent::ALL.to_vec());
        assert!(config.imports.is_empty());
        assert!(config.cache.dir().ends_with("cache"));
    }

    #[test]
    fn test_imports_and_integrations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("presync.toml");
        fs::write(
            &path,
            r#"
                namespace = "team"

                [integrations]
                github = false

                [logging]
                format = "json"

                [imports.golang.source]
                type = "git"
                repository = "https://example.com/presets.git"
                revision = "v1.2.0"
                directory = "golang"

                [imports.local]
                source = { type = "local", path = "../presets" }
                include = ["default", "strict"]
            "#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.namespace, "team");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.integrations.enabled_agents(),
            vec![Agent::Cursor, Agent::Windsurf]
        );

        let golang = &config.imports["golang"];
        assert_eq!(golang.include, vec!["default"]);
        assert!(matches!(
            &golang.source,
            ImportDetails::Git { revision: Some(rev), .. } if rev == "v1.2.0"
        ));
        assert_eq!(config.imports["local"].include, vec!["default", "strict"]);
    }

    #[test]
    fn test_rejects_nested_namespace() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("presync.yaml");
        fs::write(&path, "namespace: ../escape\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }
}
