//! UTF-8 ↔ codepoint codec and grapheme cluster segmentation
//!
//! Buffer contents are stored fully decoded; UTF-8 exists only at the I/O
//! boundary, so this module owns every conversion between the two. It also
//! segments lines of codepoints into extended grapheme clusters (UAX #29)
//! for the grapheme coordinate system and cursor motion.
//!
//! Segmentation always runs over the whole line rather than a suffix:
//! cluster breaks (regional indicator pairs in particular) depend on what
//! came before, so a suffix on its own can segment differently.

use crate::error::{BufferError, ErrorKind, Result};
use unicode_segmentation::UnicodeSegmentation;

/// One extended grapheme cluster, as the codepoints that make it up
pub type Grapheme = Vec<char>;

/// Decode a UTF-8 byte stream into codepoints.
/// Fails with `InvalidUtf8` naming the offending byte offset.
pub fn decode_utf8(bytes: &[u8]) -> Result<Vec<char>> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.chars().collect()),
        Err(e) => Err(BufferError::new(
            ErrorKind::InvalidUtf8,
            format!("invalid UTF-8 at byte offset {}", e.valid_up_to()),
        )),
    }
}

/// Append the UTF-8 encoding of one codepoint to `out`
pub fn encode_char(c: char, out: &mut Vec<u8>) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

/// Append the UTF-8 encoding of a codepoint sequence to `out`
pub fn encode_utf8(chars: &[char], out: &mut Vec<u8>) {
    for &c in chars {
        encode_char(c, out);
    }
}

/// UTF-8 byte length of one codepoint (1..=4)
#[must_use]
pub fn utf8_len(c: char) -> usize {
    c.len_utf8()
}

/// UTF-8 byte length of a codepoint sequence
#[must_use]
pub fn utf8_len_of(chars: &[char]) -> usize {
    chars.iter().map(|c| c.len_utf8()).sum()
}

/// Validate a raw 32-bit value as a Unicode scalar.
/// Rejects surrogates and values above U+10FFFF with `InvalidCodepoint`.
pub fn scalar(raw: u32) -> Result<char> {
    char::from_u32(raw).ok_or_else(|| {
        BufferError::new(
            ErrorKind::InvalidCodepoint,
            format!("U+{:X} is not a Unicode scalar value", raw),
        )
    })
}

/// Validate a raw scalar stream (e.g. handed over by an external tool)
pub fn decode_scalars(raw: &[u32]) -> Result<Vec<char>> {
    raw.iter().map(|&v| scalar(v)).collect()
}

/// Columns at which extended grapheme clusters begin.
/// Empty for an empty line; otherwise starts with 0.
#[must_use]
pub fn cluster_starts(line: &[char]) -> Vec<usize> {
    if line.is_empty() {
        return Vec::new();
    }
    let s: String = line.iter().collect();
    let mut starts = Vec::new();
    let mut col = 0;
    for (_, g) in s.grapheme_indices(true) {
        starts.push(col);
        col += g.chars().count();
    }
    starts
}

/// Column one past the end of the cluster beginning at (or containing) `col`
#[must_use]
pub fn next_cluster(line: &[char], col: usize) -> usize {
    if col >= line.len() {
        return line.len();
    }
    let starts = cluster_starts(line);
    let i = starts.partition_point(|&s| s <= col);
    starts.get(i).copied().unwrap_or(line.len())
}

/// Column of the start of the cluster ending at `col`
#[must_use]
pub fn prev_cluster(line: &[char], col: usize) -> usize {
    let col = col.min(line.len());
    let starts = cluster_starts(line);
    let i = starts.partition_point(|&s| s < col);
    if i == 0 {
        0
    } else {
        starts[i - 1]
    }
}

/// Grapheme index of the cluster containing `col`.
/// A column mid-cluster resolves to the containing cluster; the end of the
/// line resolves to the cluster count.
#[must_use]
pub fn col_to_cluster(line: &[char], col: usize) -> usize {
    if col >= line.len() {
        return cluster_starts(line).len();
    }
    let starts = cluster_starts(line);
    match starts.binary_search(&col) {
        Ok(i) => i,
        Err(i) => i - 1,
    }
}

/// Column at which cluster `idx` begins; the cluster count maps to line end
#[must_use]
pub fn cluster_to_col(line: &[char], idx: usize) -> usize {
    let starts = cluster_starts(line);
    starts.get(idx).copied().unwrap_or(line.len())
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
