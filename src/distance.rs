use crate::errors::UmiError;

/// Hamming distance between two UMIs.
///
/// Only substitutions count, UMIs are fixed length by construction. Absent
/// values and unequal lengths are refused rather than approximated. Lengths and
/// mismatches are counted in characters, not bytes.
pub fn edit_distance<'a>(
    first: impl Into<Option<&'a str>>,
    second: impl Into<Option<&'a str>>,
) -> Result<u64, UmiError> {
    let (Some(first), Some(second)) = (first.into(), second.into()) else {
        return Err(UmiError::MissingUmi);
    };
    if first.is_ascii() && second.is_ascii() {
        check_lengths(first, second, first.len(), second.len())?;
        return Ok(bio::alignment::distance::hamming(
            first.as_bytes(),
            second.as_bytes(),
        ));
    }
    check_lengths(first, second, first.chars().count(), second.chars().count())?;
    Ok(first
        .chars()
        .zip(second.chars())
        .filter(|(a, b)| a != b)
        .count() as u64)
}

fn check_lengths(
    first: &str,
    second: &str,
    len_first: usize,
    len_second: usize,
) -> Result<(), UmiError> {
    if len_first != len_second {
        return Err(UmiError::LengthMismatch {
            first: first.to_string(),
            second: second.to_string(),
        });
    }
    Ok(())
}
