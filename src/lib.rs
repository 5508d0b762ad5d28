use std::path::Path;
use anyhow::{Context, Result};

pub mod cluster;
pub mod config;
pub mod distance;
pub mod errors;
pub mod inferred;
pub mod iterator;
pub mod record;
pub mod source;

pub use cluster::{UmiPartition, partition_by_umi, split_by_umi};
pub use config::UmiClusteringConfig;
pub use distance::edit_distance;
pub use errors::UmiError;
pub use inferred::{assign_inferred_umis, most_common_umi};
pub use iterator::{UmiAwareDuplicateSetIterator, UmiClusteringStats};
pub use record::{DuplicateSet, TaggedRecord, UmiRecord};
pub use source::{DuplicateSetSource, IterSource};

/// Wrap `source` so its duplicate sets are split by UMI as configured in `toml_file`.
pub fn split_duplicate_sets<S: DuplicateSetSource>(
    source: S,
    toml_file: &Path,
) -> Result<UmiAwareDuplicateSetIterator<S>> {
    let config = UmiClusteringConfig::from_toml_file(toml_file)
        .context("Error in UMI clustering configuration")?;
    UmiAwareDuplicateSetIterator::new(source, config)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_split_duplicate_sets() {
        let mut toml = tempfile::NamedTempFile::new().unwrap();
        writeln!(toml, "max_edit_distance = 0\nadd_inferred_umi = true").unwrap();

        let reads: DuplicateSet<TaggedRecord> = ["AAAA", "AAAT", "AAAA"]
            .iter()
            .enumerate()
            .map(|(ii, umi)| TaggedRecord::new(format!("r{ii}")).with_attribute("RX", *umi))
            .collect();
        let source = IterSource::new(vec![reads]);
        let mut it = split_duplicate_sets(source, toml.path()).unwrap();
        let first = it.next_set().unwrap();
        let second = it.next_set().unwrap();
        assert!(!it.has_next());
        it.close().unwrap();

        assert_eq!(first.len(), 2);
        assert!(first.records().iter().all(|r| r.attribute("MI") == Some("AAAA")));
        assert_eq!(second.records()[0].attribute("MI"), Some("AAAT"));
    }

    #[test]
    fn test_bad_config_file() {
        let mut toml = tempfile::NamedTempFile::new().unwrap();
        writeln!(toml, "max_edit_distanze = 0").unwrap();
        let source = IterSource::new(Vec::<DuplicateSet<TaggedRecord>>::new());
        assert!(split_duplicate_sets(source, toml.path()).is_err());
    }
}
