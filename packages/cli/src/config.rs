use pinpoint_annotator::{AnnotateOptions, DEFAULT_ATTRIBUTE_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "pinpoint.config.json";

/// Pinpoint configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory edit paths are resolved against
    #[serde(default = "default_root_dir")]
    pub root_dir: String,

    /// Namespace of the injected attributes
    #[serde(default = "default_attribute_prefix")]
    pub attribute_prefix: String,

    /// File extensions picked up when annotating a directory
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Tags never annotated
    #[serde(default = "default_skip_elements")]
    pub skip_elements: Vec<String>,
}

fn default_root_dir() -> String {
    ".".to_string()
}

fn default_attribute_prefix() -> String {
    DEFAULT_ATTRIBUTE_PREFIX.to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["jsx".to_string(), "tsx".to_string()]
}

fn default_skip_elements() -> Vec<String> {
    AnnotateOptions::default().skip_elements
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid {}: {}", config_path.display(), e))?;
            tracing::debug!("Loaded {}", config_path.display());
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the root directory
    pub fn get_root_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.root_dir)
    }

    pub fn annotate_options(&self, prefix: Option<&str>) -> AnnotateOptions {
        AnnotateOptions {
            attribute_prefix: prefix.unwrap_or(self.attribute_prefix.as_str()).to_string(),
            skip_elements: self.skip_elements.clone(),
        }
    }

    pub fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.trim_start_matches('.') == ext))
            .unwrap_or(false)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            attribute_prefix: default_attribute_prefix(),
            extensions: default_extensions(),
            skip_elements: default_skip_elements(),
        }
    }
}
