// ABOUTME: Configuration management for the knotenmail application
// ABOUTME: Loads YAML or JSON configuration, applies defaults, env overrides and URL normalization

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub templates: TemplatesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Public URL of the node management form
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    pub community: CommunityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommunityConfig {
    pub name: String,
    pub domain: String,
    pub contact_email: String,
    pub sites: Vec<String>,
    pub domains: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    pub directory: PathBuf,
    pub cache: bool,
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            name: "Freifunk Musterstadt".to_string(),
            domain: "musterstadt.freifunk.net".to_string(),
            contact_email: "kontakt@musterstadt.freifunk.net".to_string(),
            sites: Vec::new(),
            domains: Vec::new(),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("mailTemplates"),
            cache: false,
            strict: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file path or default locations
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    anyhow::bail!("Configuration file not found: {}", p.display());
                }
                p
            }
            None => Self::find_config_file(),
        };

        let mut config = if config_path.exists() {
            Self::parse(&std::fs::read_to_string(&config_path)?)?
        } else {
            Config::default()
        };

        config.merge_env()?;
        config.normalize()?;

        Ok(config)
    }

    /// Parse and normalize configuration text. JSON is accepted as well, being a subset of YAML.
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let mut config = Self::parse(contents)?;
        config.normalize()?;
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> PathBuf {
        let possible_paths = vec![
            PathBuf::from("knotenmail.yaml"),
            PathBuf::from("knotenmail.yml"),
            PathBuf::from("config.json"),
        ];

        // Check current directory
        for path in possible_paths {
            if path.exists() {
                return path;
            }
        }

        // Check home directory
        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir.join(".knotenmail").join("config.yaml");
            if home_config.exists() {
                return home_config;
            }
        }

        // Return default path (may not exist)
        PathBuf::from("knotenmail.yaml")
    }

    /// Merge environment variables into configuration
    fn merge_env(&mut self) -> Result<()> {
        if let Ok(base_url) = std::env::var("KNOTENMAIL_BASE_URL") {
            self.server.base_url = base_url;
        }
        if let Ok(directory) = std::env::var("KNOTENMAIL_TEMPLATE_DIR") {
            self.templates.directory = PathBuf::from(directory);
        }
        if let Ok(cache) = std::env::var("KNOTENMAIL_TEMPLATE_CACHE") {
            self.templates.cache = cache.parse()?;
        }

        // Logging configuration
        if let Ok(level) = std::env::var("KNOTENMAIL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("KNOTENMAIL_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Strip one trailing slash from the base URL and check that it parses
    fn normalize(&mut self) -> Result<()> {
        if self.server.base_url.ends_with('/') {
            self.server.base_url.pop();
        }

        Url::parse(&self.server.base_url).map_err(|e| {
            anyhow::anyhow!("Invalid server.baseUrl '{}': {}", self.server.base_url, e)
        })?;

        Ok(())
    }
}
