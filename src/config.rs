use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub load: LoadConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Where the archive lives: candidate base URLs tried in order.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub bases: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoadConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_batch_size() -> usize {
    crate::loader::DEFAULT_BATCH_SIZE
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    /// Days covered by the default range when no filter is given
    /// (one year of history, ending today).
    #[serde(default = "default_range_days")]
    pub default_range_days: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_range_days: default_range_days(),
        }
    }
}

fn default_range_days() -> u32 {
    365
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.source.bases.is_empty() {
        anyhow::bail!("source.bases must list at least one candidate base URL");
    }
    if config.load.batch_size == 0 {
        anyhow::bail!("load.batch_size must be > 0");
    }
    if config.render.page_size == 0 {
        anyhow::bail!("render.page_size must be > 0");
    }
    if config.filter.default_range_days == 0 {
        anyhow::bail!("filter.default_range_days must be > 0");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("llg.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let (_dir, path) = write_config(
            r#"[source]
bases = ["http://localhost:8000/workspace/lifelog/"]
"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.load.batch_size, 20);
        assert_eq!(config.render.page_size, 200);
        assert_eq!(config.filter.default_range_days, 365);
    }

    #[test]
    fn rejects_empty_base_list() {
        let (_dir, path) = write_config("[source]\nbases = []\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let (_dir, path) = write_config(
            r#"[source]
bases = ["http://localhost:8000/lifelog/"]

[load]
batch_size = 0
"#,
        );
        assert!(load_config(&path).is_err());
    }
}
