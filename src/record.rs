use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use rust_htslib::bam::{self, record::Aux};

/// Named string attributes on a read. The UMI is just one attribute key.
pub trait UmiRecord {
    /// `Ok(None)` if the attribute is absent.
    fn string_attribute(&self, key: &str) -> Result<Option<&str>>;

    /// Sets `key` to `value`, replacing any previous value.
    fn set_string_attribute(&mut self, key: &str, value: &str) -> Result<()>;
}

/// htslib only looks at (and reads) the first two bytes of a tag.
fn bam_tag(key: &str) -> Result<&[u8]> {
    if key.len() != 2 {
        bail!("BAM tags must be exactly two characters long, got {key:?}");
    }
    Ok(key.as_bytes())
}

impl UmiRecord for bam::Record {
    fn string_attribute(&self, key: &str) -> Result<Option<&str>> {
        match self.aux(bam_tag(key)?) {
            Ok(Aux::String(v)) => Ok(Some(v)),
            Ok(other) => bail!(
                "Expected tag {} to be a string, found {:?} on read {}",
                key,
                other,
                std::str::from_utf8(self.qname()).unwrap_or("<invalid UTF-8>")
            ),
            Err(rust_htslib::errors::Error::BamAuxTagNotFound) => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read tag {key}")),
        }
    }

    fn set_string_attribute(&mut self, key: &str, value: &str) -> Result<()> {
        let tag = bam_tag(key)?;
        if self.aux(tag).is_ok() {
            self.remove_aux(tag)
                .with_context(|| format!("Failed to remove existing tag {key}"))?;
        }
        self.push_aux(tag, Aux::String(value))
            .with_context(|| format!("Failed to set tag {key} to {value}"))?;
        Ok(())
    }
}

/// A read held in memory: a name plus its string attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaggedRecord {
    pub name: String,
    attributes: BTreeMap<String, String>,
}

impl TaggedRecord {
    pub fn new(name: impl Into<String>) -> TaggedRecord {
        TaggedRecord {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

impl UmiRecord for TaggedRecord {
    fn string_attribute(&self, key: &str) -> Result<Option<&str>> {
        Ok(self.attribute(key))
    }

    fn set_string_attribute(&mut self, key: &str, value: &str) -> Result<()> {
        self.attributes.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Records believed to be duplicates of one another.
///
/// Only membership matters, the order is whatever the producer appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSet<R> {
    records: Vec<R>,
}

impl<R> DuplicateSet<R> {
    pub fn new() -> DuplicateSet<R> {
        DuplicateSet {
            records: Vec::new(),
        }
    }

    pub fn add(&mut self, record: R) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [R] {
        &mut self.records
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R> Default for DuplicateSet<R> {
    fn default() -> Self {
        DuplicateSet::new()
    }
}

impl<R> From<Vec<R>> for DuplicateSet<R> {
    fn from(records: Vec<R>) -> Self {
        DuplicateSet { records }
    }
}

impl<R> FromIterator<R> for DuplicateSet<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        DuplicateSet {
            records: iter.into_iter().collect(),
        }
    }
}

impl<R> IntoIterator for DuplicateSet<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
