use thiserror::Error;

/// Everything that can abort splitting a duplicate set by UMI.
///
/// A record without a UMI is *not* an error, the set is passed through unsplit.
#[derive(Error, Debug)]
pub enum UmiError {
    /// Two UMIs of different length were compared. Upstream data is malformed.
    #[error("Barcode {first} and {second} do not have matching lengths.")]
    LengthMismatch { first: String, second: String },

    /// An absent UMI reached the comparison.
    #[error("Attempt to compare two incomparable UMIs. At least one of the UMIs was missing.")]
    MissingUmi,

    /// `next_set` was called although `has_next` was false.
    #[error("No more duplicate sets available")]
    Exhausted,

    #[error("Failed to access record attribute")]
    Record(#[source] anyhow::Error),

    #[error("Upstream duplicate set source failed")]
    Source(#[source] anyhow::Error),
}
