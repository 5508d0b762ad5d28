//! Splitting one positional duplicate set into UMI families.
//!
//! Distinct UMIs become nodes of an undirected graph, UMIs within
//! `max_edit_distance` mismatches of each other are linked, and every connected
//! component turns into one output set (single linkage: A-B and B-C put A, B
//! and C together even when A and C are far apart).
use itertools::Itertools;
use log::debug;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Dfs;

use crate::distance::edit_distance;
use crate::errors::UmiError;
use crate::record::{DuplicateSet, UmiRecord};

const UNVISITED: usize = usize::MAX;

/// Outcome of splitting one duplicate set.
#[derive(Debug, PartialEq, Eq)]
pub enum UmiPartition<R> {
    /// At least one read had no UMI, the set is kept as it was.
    Unsplit(DuplicateSet<R>),
    /// One set per UMI cluster.
    Families(Vec<DuplicateSet<R>>),
}

impl<R> UmiPartition<R> {
    pub fn into_sets(self) -> Vec<DuplicateSet<R>> {
        match self {
            UmiPartition::Unsplit(set) => vec![set],
            UmiPartition::Families(families) => families,
        }
    }
}

/// Partition `set` by UMI.
///
/// If any record lacks `umi_tag` the set is returned untouched as the only
/// element. Otherwise the records are stably sorted by UMI and one set per UMI
/// cluster is returned, clusters ordered by their lexicographically smallest
/// UMI. The result is never empty.
pub fn split_by_umi<R: UmiRecord>(
    set: DuplicateSet<R>,
    max_edit_distance: u32,
    umi_tag: &str,
) -> Result<Vec<DuplicateSet<R>>, UmiError> {
    Ok(partition_by_umi(set, max_edit_distance, umi_tag)?.into_sets())
}

/// Like [`split_by_umi`], but tells apart a set left unsplit for lack of UMIs.
pub fn partition_by_umi<R: UmiRecord>(
    set: DuplicateSet<R>,
    max_edit_distance: u32,
    umi_tag: &str,
) -> Result<UmiPartition<R>, UmiError> {
    if set.is_empty() {
        return Ok(UmiPartition::Families(vec![set]));
    }
    let Some(umis) = collect_umis(&set, umi_tag)? else {
        debug!(
            "Duplicate set of {} reads has reads without {} tag, not splitting",
            set.len(),
            umi_tag
        );
        return Ok(UmiPartition::Unsplit(set));
    };

    let mut keyed: Vec<(String, R)> = umis.into_iter().zip(set).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut distinct: Vec<&str> = Vec::new();
    let mut node_of_read = Vec::with_capacity(keyed.len());
    for (umi, _) in &keyed {
        if distinct.last() != Some(&umi.as_str()) {
            distinct.push(umi);
        }
        node_of_read.push(distinct.len() - 1);
    }

    let component_of_node = connected_components(&distinct, max_edit_distance)?;
    let no_of_components = component_of_node
        .iter()
        .max()
        .map_or(0, |last| last + 1);
    debug!(
        "{} reads, {} distinct UMIs, {} families",
        keyed.len(),
        distinct.len(),
        no_of_components
    );

    let mut families: Vec<DuplicateSet<R>> = (0..no_of_components)
        .map(|_| DuplicateSet::new())
        .collect();
    for ((_umi, read), node) in keyed.into_iter().zip(node_of_read) {
        families[component_of_node[node]].add(read);
    }
    Ok(UmiPartition::Families(families))
}

/// The UMI of every read in order, or `None` as soon as one read has none.
fn collect_umis<R: UmiRecord>(
    set: &DuplicateSet<R>,
    umi_tag: &str,
) -> Result<Option<Vec<String>>, UmiError> {
    let mut umis = Vec::with_capacity(set.len());
    for read in set.records() {
        match read.string_attribute(umi_tag).map_err(UmiError::Record)? {
            Some(umi) => umis.push(umi.to_string()),
            None => return Ok(None),
        }
    }
    Ok(Some(umis))
}

/// Component label per UMI. Labels count up from 0 in order of the first
/// node of each component.
fn connected_components(umis: &[&str], max_edit_distance: u32) -> Result<Vec<usize>, UmiError> {
    let mut graph = UnGraph::<(), ()>::with_capacity(umis.len(), umis.len());
    for _ in umis {
        graph.add_node(());
    }
    // every pair is compared, so a UMI of a different length never slips through
    for (a, b) in (0..umis.len()).tuple_combinations() {
        if edit_distance(umis[a], umis[b])? <= max_edit_distance as u64 {
            graph.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
        }
    }

    let mut component = vec![UNVISITED; umis.len()];
    let mut next_label = 0;
    for start in graph.node_indices() {
        if component[start.index()] != UNVISITED {
            continue;
        }
        let mut dfs = Dfs::new(&graph, start);
        while let Some(node) = dfs.next(&graph) {
            component[node.index()] = next_label;
        }
        next_label += 1;
    }
    Ok(component)
}
