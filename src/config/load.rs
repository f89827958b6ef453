use crate::config::types::Config;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

impl Config {
    /// 沒有指定設定檔時使用預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        if config.frame_extensions.is_empty() {
            bail!("{}: frame_extensions must not be empty", path.display());
        }

        Ok(config)
    }
}
