use std::collections::BTreeMap;

use crate::errors::UmiError;
use crate::record::{DuplicateSet, UmiRecord};

/// The most common UMI in `family`. Ties go to the lexicographically smallest.
/// `None` for an empty family.
pub fn most_common_umi<R: UmiRecord>(
    family: &DuplicateSet<R>,
    umi_tag: &str,
) -> Result<Option<String>, UmiError> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for read in family.records() {
        let umi = read
            .string_attribute(umi_tag)
            .map_err(UmiError::Record)?
            .ok_or(UmiError::MissingUmi)?;
        *counts.entry(umi).or_default() += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (umi, count) in counts {
        //strictly greater, so the first (smallest) UMI wins a tie
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((umi, count));
        }
    }
    Ok(best.map(|(umi, _)| umi.to_string()))
}

/// Write each family's most common UMI onto all of its reads, in place.
pub fn assign_inferred_umis<R: UmiRecord>(
    families: &mut [DuplicateSet<R>],
    umi_tag: &str,
    inferred_umi_tag: &str,
) -> Result<(), UmiError> {
    for family in families.iter_mut() {
        let Some(inferred) = most_common_umi(family, umi_tag)? else {
            continue;
        };
        for read in family.records_mut() {
            read.set_string_attribute(inferred_umi_tag, &inferred)
                .map_err(UmiError::Record)?;
        }
    }
    Ok(())
}
