use std::collections::VecDeque;

use anyhow::Context;
use log::{debug, info};

use crate::cluster::{UmiPartition, partition_by_umi};
use crate::config::UmiClusteringConfig;
use crate::errors::UmiError;
use crate::inferred::assign_inferred_umis;
use crate::record::DuplicateSet;
use crate::source::DuplicateSetSource;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UmiClusteringStats {
    /// positional duplicate sets pulled from upstream
    pub sets_in: usize,
    /// UMI families handed out
    pub sets_out: usize,
    /// sets passed on unsplit because a read had no UMI
    pub passed_through: usize,
    pub reads: usize,
}

/// Wraps a source of positional duplicate sets and splits each of them into
/// UMI families.
///
/// Pull based: every `next_set` either hands out a buffered family or pulls
/// and splits exactly one upstream set.
pub struct UmiAwareDuplicateSetIterator<S: DuplicateSetSource> {
    source: S,
    config: UmiClusteringConfig,
    pending: VecDeque<DuplicateSet<S::Record>>,
    stats: UmiClusteringStats,
    closed: bool,
}

impl<S: DuplicateSetSource> UmiAwareDuplicateSetIterator<S> {
    /// Fails if `config` does not pass [`UmiClusteringConfig::check`].
    pub fn new(source: S, config: UmiClusteringConfig) -> anyhow::Result<Self> {
        config
            .check()
            .context("Invalid UMI clustering configuration")?;
        Ok(UmiAwareDuplicateSetIterator {
            source,
            config,
            pending: VecDeque::new(),
            stats: UmiClusteringStats::default(),
            closed: false,
        })
    }

    pub fn config(&self) -> &UmiClusteringConfig {
        &self.config
    }

    pub fn stats(&self) -> UmiClusteringStats {
        self.stats
    }

    pub fn has_next(&mut self) -> bool {
        !self.pending.is_empty() || (!self.closed && self.source.has_next())
    }

    pub fn next_set(&mut self) -> Result<DuplicateSet<S::Record>, UmiError> {
        if self.pending.is_empty() {
            if !self.has_next() {
                return Err(UmiError::Exhausted);
            }
            let set = self.source.next_set().map_err(UmiError::Source)?;
            self.pending = self.process(set)?;
        }
        let family = self.pending.pop_front().ok_or(UmiError::Exhausted)?;
        self.stats.sets_out += 1;
        Ok(family)
    }

    /// Split one upstream set. Nothing is buffered unless it fully succeeds.
    fn process(
        &mut self,
        set: DuplicateSet<S::Record>,
    ) -> Result<VecDeque<DuplicateSet<S::Record>>, UmiError> {
        let reads = set.len();
        self.stats.sets_in += 1;
        self.stats.reads += reads;

        let families = match partition_by_umi(
            set,
            self.config.max_edit_distance,
            &self.config.umi_tag,
        )? {
            UmiPartition::Unsplit(set) => {
                self.stats.passed_through += 1;
                vec![set]
            }
            UmiPartition::Families(mut families) => {
                if self.config.add_inferred_umi {
                    assign_inferred_umis(
                        &mut families,
                        &self.config.umi_tag,
                        &self.config.inferred_umi_tag,
                    )?;
                }
                families
            }
        };
        debug!("Split {} reads into {} UMI families", reads, families.len());
        Ok(families.into())
    }

    /// Close the upstream source. Families already handed out stay valid, and
    /// families still buffered can be drained.
    pub fn close(&mut self) -> Result<(), UmiError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        info!(
            "UMI clustering: {} duplicate sets ({} reads) in, {} families out, {} sets without UMIs left unsplit",
            self.stats.sets_in, self.stats.reads, self.stats.sets_out, self.stats.passed_through
        );
        self.source.close().map_err(UmiError::Source)
    }
}

impl<S: DuplicateSetSource> Iterator for UmiAwareDuplicateSetIterator<S> {
    type Item = Result<DuplicateSet<S::Record>, UmiError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_next() {
            Some(self.next_set())
        } else {
            None
        }
    }
}
