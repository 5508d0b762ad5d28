use std::iter::Peekable;

use anyhow::Result;

use crate::record::{DuplicateSet, UmiRecord};

/// Upstream producer of positional duplicate sets.
pub trait DuplicateSetSource {
    type Record: UmiRecord;

    /// Whether `next_set` would yield another set. Must not consume anything.
    fn has_next(&mut self) -> bool;

    fn next_set(&mut self) -> Result<DuplicateSet<Self::Record>>;

    /// Release whatever the source holds. Calling it twice is harmless.
    fn close(&mut self) -> Result<()>;
}

/// Turns any iterator of duplicate sets into a [`DuplicateSetSource`].
pub struct IterSource<I: Iterator> {
    inner: Option<Peekable<I>>,
}

impl<I: Iterator> IterSource<I> {
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        IterSource {
            inner: Some(iter.into_iter().peekable()),
        }
    }
}

impl<R, I> DuplicateSetSource for IterSource<I>
where
    R: UmiRecord,
    I: Iterator<Item = DuplicateSet<R>>,
{
    type Record = R;

    fn has_next(&mut self) -> bool {
        self.inner.as_mut().is_some_and(|it| it.peek().is_some())
    }

    fn next_set(&mut self) -> Result<DuplicateSet<R>> {
        match self.inner.as_mut() {
            Some(it) => it
                .next()
                .ok_or_else(|| anyhow::anyhow!("Duplicate set source is exhausted")),
            None => anyhow::bail!("Duplicate set source was closed"),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.inner = None;
        Ok(())
    }
}
