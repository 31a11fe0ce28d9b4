//! Compact encodings for index and count sequences.
//!
//! Index sequences are stored as comma separated tokens. A bare number is a
//! single index and `start+extra` stands for `start..=start+extra`, so
//! `[0, 1, 2, 5]` becomes `"0+2,5"`. Tokens keep their input order, so
//! sequences that are not sorted still round-trip (they just compress less).
//!
//! Count sequences (overlap matrix rows) use `value*repeat` for repeated
//! values instead, so `[3, 3, 3, 0]` becomes `"3*3,0"`.

use std::fmt::Write;

use crate::error::{Result, SetlapError};

/// Whether compact string encodings should be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Compress {
    /// Use the string form when it is estimated to be smaller.
    #[default]
    Auto,
    /// Always use the string form.
    Yes,
    /// Always use the raw form.
    No,
}

/// An index sequence in either raw or compressed form.
///
/// The decoder tells the forms apart by shape alone.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum IndicesArray {
    Compressed(String),
    Raw(Vec<usize>),
}

impl IndicesArray {
    /// Decodes to the plain index sequence.
    pub fn to_indices(&self) -> Result<Vec<usize>> {
        match self {
            IndicesArray::Compressed(s) => decompress_indices(s),
            IndicesArray::Raw(indices) => Ok(indices.clone()),
        }
    }

    /// Decodes to the plain index sequence, requiring every index to be
    /// below `len`.
    pub fn to_indices_within(&self, len: usize) -> Result<Vec<usize>> {
        match self {
            IndicesArray::Compressed(s) => decompress_indices_within(s, len),
            IndicesArray::Raw(indices) => match indices.iter().find(|&&i| i >= len) {
                Some(&index) => Err(SetlapError::IndexOutOfRange {
                    what: "elements",
                    index,
                    len,
                }),
                None => Ok(indices.clone()),
            },
        }
    }
}

/// A count sequence in either raw or compressed form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum CountsArray {
    Compressed(String),
    Raw(Vec<usize>),
}

impl CountsArray {
    /// Decodes to the plain count sequence.
    pub fn to_counts(&self) -> Result<Vec<usize>> {
        match self {
            CountsArray::Compressed(s) => decompress_counts(s),
            CountsArray::Raw(counts) => Ok(counts.clone()),
        }
    }

    /// Decodes to the plain count sequence, failing once it would grow past
    /// `max_len` values.
    pub fn to_counts_within(&self, max_len: usize) -> Result<Vec<usize>> {
        match self {
            CountsArray::Compressed(s) => decompress_counts_within(s, max_len),
            CountsArray::Raw(counts) if counts.len() > max_len => {
                Err(SetlapError::IndexOutOfRange {
                    what: "counts",
                    index: max_len,
                    len: max_len,
                })
            }
            CountsArray::Raw(counts) => Ok(counts.clone()),
        }
    }
}

/// Run-length encodes consecutive index runs.
///
/// # Example
///
/// ```
/// use setlap_core::codec::{compress_indices, decompress_indices};
///
/// assert_eq!(compress_indices(&[0, 1, 2]), "0+2");
/// assert_eq!(compress_indices(&[0, 1, 2, 5, 7, 8]), "0+2,5,7,8");
/// assert_eq!(decompress_indices("0+2,5").unwrap(), vec![0, 1, 2, 5]);
/// ```
pub fn compress_indices(indices: &[usize]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < indices.len() {
        let start = indices[i];
        let mut extra = 0;
        while i + extra + 1 < indices.len()
            && start.checked_add(extra + 1) == Some(indices[i + extra + 1])
        {
            extra += 1;
        }
        if !out.is_empty() {
            out.push(',');
        }
        let _ = match extra {
            0 => write!(out, "{start}"),
            1 => write!(out, "{start},{}", start + 1),
            _ => write!(out, "{start}+{extra}"),
        };
        i += extra + 1;
    }
    out
}

/// Decodes the output of [`compress_indices`].
///
/// Runs are expanded without a length bound; input that did not come from
/// [`compress_indices`] should go through [`decompress_indices_within`].
///
/// # Errors
///
/// Returns [`SetlapError::MalformedIndices`] for tokens that are not
/// `n` or `n+m`, or whose run end overflows.
pub fn decompress_indices(encoded: &str) -> Result<Vec<usize>> {
    decode_indices(encoded, None)
}

/// Decodes the output of [`compress_indices`], requiring every index to be
/// below `len`.
///
/// Runs are checked before they are expanded, so a token such as
/// `0+1099511627776` fails without allocating.
///
/// # Errors
///
/// Returns [`SetlapError::IndexOutOfRange`] for indices at or past `len`,
/// and [`SetlapError::MalformedIndices`] for bad tokens.
pub fn decompress_indices_within(encoded: &str, len: usize) -> Result<Vec<usize>> {
    decode_indices(encoded, Some(len))
}

fn decode_indices(encoded: &str, bound: Option<usize>) -> Result<Vec<usize>> {
    let mut out = Vec::new();
    if encoded.trim().is_empty() {
        return Ok(out);
    }
    for token in encoded.split(',') {
        let token = token.trim();
        let (start, end) = match token.split_once('+') {
            Some((start, extra)) => {
                let start = parse_number(start, token)?;
                let extra = parse_number(extra, token)?;
                let end = start
                    .checked_add(extra)
                    .ok_or_else(|| SetlapError::MalformedIndices(token.to_string()))?;
                (start, end)
            }
            None => {
                let index = parse_number(token, token)?;
                (index, index)
            }
        };
        if let Some(len) = bound {
            if end >= len {
                return Err(SetlapError::IndexOutOfRange {
                    what: "elements",
                    index: end,
                    len,
                });
            }
        }
        out.extend(start..=end);
    }
    Ok(out)
}

/// Run-length encodes repeated counts.
pub fn compress_counts(counts: &[usize]) -> String {
    let mut out = String::new();
    let mut i = 0;
    while i < counts.len() {
        let value = counts[i];
        let repeat = counts[i..].iter().take_while(|&&c| c == value).count();
        if !out.is_empty() {
            out.push(',');
        }
        let _ = match repeat {
            1 => write!(out, "{value}"),
            2 => write!(out, "{value},{value}"),
            _ => write!(out, "{value}*{repeat}"),
        };
        i += repeat;
    }
    out
}

/// Decodes the output of [`compress_counts`].
///
/// # Errors
///
/// Returns [`SetlapError::MalformedIndices`] for tokens that are not
/// `n` or `n*m`.
pub fn decompress_counts(encoded: &str) -> Result<Vec<usize>> {
    decode_counts(encoded, None)
}

/// Decodes the output of [`compress_counts`], refusing to produce more than
/// `max_len` values.
///
/// # Errors
///
/// Returns [`SetlapError::IndexOutOfRange`] once the decoded length would
/// pass `max_len`, and [`SetlapError::MalformedIndices`] for bad tokens.
pub fn decompress_counts_within(encoded: &str, max_len: usize) -> Result<Vec<usize>> {
    decode_counts(encoded, Some(max_len))
}

fn decode_counts(encoded: &str, max_len: Option<usize>) -> Result<Vec<usize>> {
    let mut out = Vec::new();
    if encoded.trim().is_empty() {
        return Ok(out);
    }
    for token in encoded.split(',') {
        let token = token.trim();
        let (value, repeat) = match token.split_once('*') {
            Some((value, repeat)) => (parse_number(value, token)?, parse_number(repeat, token)?),
            None => (parse_number(token, token)?, 1),
        };
        let total = out
            .len()
            .checked_add(repeat)
            .ok_or_else(|| SetlapError::MalformedIndices(token.to_string()))?;
        if let Some(max_len) = max_len {
            if total > max_len {
                return Err(SetlapError::IndexOutOfRange {
                    what: "counts",
                    index: total - 1,
                    len: max_len,
                });
            }
        }
        out.extend(std::iter::repeat(value).take(repeat));
    }
    Ok(out)
}

fn parse_number(s: &str, token: &str) -> Result<usize> {
    s.trim()
        .parse()
        .map_err(|_| SetlapError::MalformedIndices(token.to_string()))
}

/// Approximate length of `values` serialized as a JSON array.
fn raw_json_len(values: &[usize]) -> usize {
    let digits: usize = values
        .iter()
        .map(|v| v.checked_ilog10().unwrap_or(0) as usize + 1)
        .sum();
    digits + values.len().saturating_sub(1) + 2
}

/// The string form wins when it is under 60% of the raw form.
fn prefer_compressed(encoded: &str, values: &[usize], compress: Compress) -> bool {
    match compress {
        Compress::Yes => true,
        Compress::No => false,
        Compress::Auto => (encoded.len() + 2) * 10 < raw_json_len(values) * 6,
    }
}

/// Encodes an index sequence in whichever form `compress` selects.
pub fn to_indices_array(indices: &[usize], compress: Compress) -> IndicesArray {
    if compress == Compress::No {
        return IndicesArray::Raw(indices.to_vec());
    }
    let encoded = compress_indices(indices);
    if prefer_compressed(&encoded, indices, compress) {
        IndicesArray::Compressed(encoded)
    } else {
        IndicesArray::Raw(indices.to_vec())
    }
}

/// Encodes a count sequence in whichever form `compress` selects.
pub fn to_counts_array(counts: &[usize], compress: Compress) -> CountsArray {
    if compress == Compress::No {
        return CountsArray::Raw(counts.to_vec());
    }
    let encoded = compress_counts(counts);
    if prefer_compressed(&encoded, counts, compress) {
        CountsArray::Compressed(encoded)
    } else {
        CountsArray::Raw(counts.to_vec())
    }
}

/// Resolves an encoded index sequence against the element universe.
///
/// # Errors
///
/// Fails on malformed tokens and on indices outside `universe`.
pub fn from_indices_array<T: Clone>(indices: &IndicesArray, universe: &[T]) -> Result<Vec<T>> {
    Ok(indices
        .to_indices_within(universe.len())?
        .into_iter()
        .map(|i| universe[i].clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_runs_and_singletons() {
        assert_eq!(compress_indices(&[]), "");
        assert_eq!(compress_indices(&[4]), "4");
        assert_eq!(compress_indices(&[4, 5]), "4,5");
        assert_eq!(compress_indices(&[0, 1, 2]), "0+2");
        assert_eq!(compress_indices(&[1, 3, 4, 5, 6, 10]), "1,3+3,10");
    }

    #[test]
    fn test_unsorted_sequence_keeps_order() {
        let xs = [9, 2, 3, 4, 0];
        let encoded = compress_indices(&xs);
        assert_eq!(encoded, "9,2+2,0");
        assert_eq!(decompress_indices(&encoded).unwrap(), xs);
    }

    #[test]
    fn test_round_trip_against_universe() {
        let universe: Vec<char> = "abcdefghijklmnop".chars().collect();
        let xs = vec![0, 1, 2, 3, 7, 9, 10, 15];
        for compress in [Compress::Auto, Compress::Yes, Compress::No] {
            let encoded = to_indices_array(&xs, compress);
            let decoded = from_indices_array(&encoded, &universe).unwrap();
            let expected: Vec<char> = xs.iter().map(|&i| universe[i]).collect();
            assert_eq!(decoded, expected);
        }
    }

    #[test]
    fn test_auto_picks_smaller_form() {
        let run: Vec<usize> = (100..200).collect();
        assert!(matches!(to_indices_array(&run, Compress::Auto), IndicesArray::Compressed(_)));

        let scattered = vec![1, 5, 9, 13];
        assert!(matches!(to_indices_array(&scattered, Compress::Auto), IndicesArray::Raw(_)));
    }

    #[test]
    fn test_malformed_and_out_of_range() {
        assert_eq!(
            decompress_indices("1,x").unwrap_err(),
            SetlapError::MalformedIndices("x".into())
        );
        let universe = [10, 20];
        let err = from_indices_array(&IndicesArray::Raw(vec![0, 2]), &universe).unwrap_err();
        assert_eq!(
            err,
            SetlapError::IndexOutOfRange {
                what: "elements",
                index: 2,
                len: 2
            }
        );
    }

    #[test]
    fn test_overflowing_run_is_malformed() {
        assert_eq!(
            decompress_indices("18446744073709551615+1").unwrap_err(),
            SetlapError::MalformedIndices("18446744073709551615+1".into())
        );
        assert_eq!(
            decompress_counts("1*5,0*18446744073709551615").unwrap_err(),
            SetlapError::MalformedIndices("0*18446744073709551615".into())
        );
        assert_eq!(compress_indices(&[usize::MAX, 0]), format!("{},0", usize::MAX));
    }

    #[test]
    fn test_huge_run_fails_before_expanding() {
        let encoded = IndicesArray::Compressed("0+1099511627776".into());
        let err = from_indices_array(&encoded, &[1u8, 2]).unwrap_err();
        assert_eq!(
            err,
            SetlapError::IndexOutOfRange {
                what: "elements",
                index: 1_099_511_627_776,
                len: 2
            }
        );
        assert!(decompress_indices_within("0,1,7", 3).is_err());
        assert_eq!(decompress_indices_within("0+2", 3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_counts_capped_by_expected_length() {
        let err = CountsArray::Compressed("1*1099511627776".into())
            .to_counts_within(10)
            .unwrap_err();
        assert!(matches!(err, SetlapError::IndexOutOfRange { what: "counts", len: 10, .. }));
        assert!(CountsArray::Raw(vec![1, 2, 3]).to_counts_within(2).is_err());
        assert_eq!(decompress_counts_within("4*3", 3).unwrap(), vec![4, 4, 4]);
    }

    #[test]
    fn test_counts_round_trip() {
        let row = vec![3, 3, 3, 0, 0, 1, 7, 7, 7, 7];
        let encoded = compress_counts(&row);
        assert_eq!(encoded, "3*3,0,0,1,7*4");
        assert_eq!(decompress_counts(&encoded).unwrap(), row);
        assert_eq!(to_counts_array(&row, Compress::Yes).to_counts().unwrap(), row);
    }
}
