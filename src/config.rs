use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

fn default_max_edit_distance() -> u32 {
    1
}

fn default_umi_tag() -> String {
    "RX".to_string()
}

fn default_inferred_umi_tag() -> String {
    "MI".to_string()
}

fn validate_tags(config: &UmiClusteringConfig) -> Result<(), serde_valid::validation::Error> {
    if config.add_inferred_umi && config.umi_tag == config.inferred_umi_tag {
        Err(serde_valid::validation::Error::Custom(
            "inferred_umi_tag must differ from umi_tag when add_inferred_umi is set".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// How duplicate sets are split by UMI. Fixed once an iterator is built.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Validate)]
#[serde(deny_unknown_fields)]
#[validate(custom = |s| validate_tags(s))]
pub struct UmiClusteringConfig {
    /// UMIs at most this many mismatches apart are joined.
    #[serde(default = "default_max_edit_distance")]
    pub max_edit_distance: u32,
    #[serde(default)]
    pub add_inferred_umi: bool,
    /// Two character BAM tag holding the raw UMI.
    #[serde(default = "default_umi_tag")]
    #[validate(pattern = r"^[A-Za-z][A-Za-z0-9]$")]
    pub umi_tag: String,
    #[serde(default = "default_inferred_umi_tag")]
    #[validate(pattern = r"^[A-Za-z][A-Za-z0-9]$")]
    pub inferred_umi_tag: String,
}

impl Default for UmiClusteringConfig {
    fn default() -> Self {
        UmiClusteringConfig {
            max_edit_distance: default_max_edit_distance(),
            add_inferred_umi: false,
            umi_tag: default_umi_tag(),
            inferred_umi_tag: default_inferred_umi_tag(),
        }
    }
}

impl UmiClusteringConfig {
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(|e| anyhow!("{e}"))?;
        Ok(())
    }

    pub fn from_toml_str(raw_config: &str) -> Result<Self> {
        let parsed = toml::from_str::<UmiClusteringConfig>(raw_config)
            .context("Could not parse UMI clustering configuration")?;
        parsed.check().context("Error in configuration")?;
        Ok(parsed)
    }

    pub fn from_toml_file(toml_file: &Path) -> Result<Self> {
        let raw_config = ex::fs::read_to_string(toml_file)
            .with_context(|| format!("Could not read toml file: {}", toml_file.to_string_lossy()))?;
        Self::from_toml_str(&raw_config)
            .with_context(|| format!("Could not load toml file: {}", toml_file.to_string_lossy()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = UmiClusteringConfig::from_toml_str("").unwrap();
        assert_eq!(config, UmiClusteringConfig::default());
        assert_eq!(config.max_edit_distance, 1);
        assert!(!config.add_inferred_umi);
        assert_eq!(config.umi_tag, "RX");
        assert_eq!(config.inferred_umi_tag, "MI");
    }

    #[test]
    fn test_parse() {
        let config = UmiClusteringConfig::from_toml_str(
            "max_edit_distance = 0\nadd_inferred_umi = true\numi_tag = 'BX'\ninferred_umi_tag = 'BI'\n",
        )
        .unwrap();
        assert_eq!(config.max_edit_distance, 0);
        assert!(config.add_inferred_umi);
        assert_eq!(config.umi_tag, "BX");
        assert_eq!(config.inferred_umi_tag, "BI");
    }

    #[test]
    fn test_rejects() {
        assert!(UmiClusteringConfig::from_toml_str("max_edit_distance = -1").is_err());
        assert!(UmiClusteringConfig::from_toml_str("edit_distance = 1").is_err());
        assert!(UmiClusteringConfig::from_toml_str("umi_tag = ''").is_err());
        assert!(UmiClusteringConfig::from_toml_str("umi_tag = 'R'").is_err());
        assert!(UmiClusteringConfig::from_toml_str("inferred_umi_tag = '1X'").is_err());
        assert!(
            UmiClusteringConfig::from_toml_str(
                "add_inferred_umi = true\numi_tag = 'RX'\ninferred_umi_tag = 'RX'"
            )
            .is_err()
        );
        // same tag is fine as long as nothing is written
        assert!(
            UmiClusteringConfig::from_toml_str("umi_tag = 'RX'\ninferred_umi_tag = 'RX'").is_ok()
        );
    }

    #[test]
    fn test_tags_must_be_two_characters() {
        // both would end up in the BAM tag RX
        assert!(
            UmiClusteringConfig::from_toml_str(
                "add_inferred_umi = true\numi_tag = 'RXZ'\ninferred_umi_tag = 'RXY'"
            )
            .is_err()
        );
        let config = UmiClusteringConfig {
            umi_tag: "RXZ".to_string(),
            ..Default::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_edit_distance = 2").unwrap();
        let config = UmiClusteringConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.max_edit_distance, 2);

        let missing = file.path().with_extension("does_not_exist");
        assert!(UmiClusteringConfig::from_toml_file(&missing).is_err());
    }
}
