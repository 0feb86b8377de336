//! 設定ファイル（TOML）
//!
//! ```toml
//! format = "kif"
//! output = "json"
//! strict = false
//!
//! [transpile]
//! reject_double_pawn = true
//! check_turn = true
//! ```
//!
//! コマンドラインで指定した値が優先される。

use std::path::Path;

use anyhow::{Context, Result};
use kifu_notation::{FormatHint, TranspileOptions};
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    pub format: Option<FormatHint>,
    pub output: Option<OutputFormat>,
    pub strict: Option<bool>,
    pub transpile: TranspileOptions,
}

impl ConvertConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: ConvertConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        log::debug!("loaded config from {}: {config:?}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: ConvertConfig = toml::from_str(
            r#"
format = "csa"
output = "sfen"
strict = true

[transpile]
reject_double_pawn = true
"#,
        )
        .unwrap();
        assert_eq!(config.format, Some(FormatHint::Csa));
        assert_eq!(config.output, Some(OutputFormat::Sfen));
        assert_eq!(config.strict, Some(true));
        assert!(config.transpile.reject_double_pawn);
        // 省略した項目は既定値
        assert!(config.transpile.check_turn);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: ConvertConfig = toml::from_str("").unwrap();
        assert_eq!(config, ConvertConfig::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(toml::from_str::<ConvertConfig>("colour = true").is_err());
    }
}
