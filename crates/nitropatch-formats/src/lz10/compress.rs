//! Greedy LZ10 encoder with hash-chained match finding.
//!
//! Candidate positions are indexed by a hash of their first three bytes
//! into per-bucket chains. The search window is the most recent 4096
//! bytes (the format's displacement limit) and each position probes at
//! most [`MAX_PROBES`] candidates, so work per input byte is bounded.
//! The longest match found within the probe budget wins; the first
//! candidate found wins length ties.

use super::{LZ10_TAG, MAX_DISTANCE, MAX_MATCH, MIN_MATCH};

const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const MAX_PROBES: usize = 64;

struct MatchFinder<'a> {
    data: &'a [u8],
    /// Most recent position per hash bucket, -1 when empty.
    head: Vec<i32>,
    /// Previous position in the chain, indexed by `pos & (window - 1)`.
    /// Slots recycle once a position falls out of the search window.
    prev: Vec<i32>,
}

impl<'a> MatchFinder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            head: vec![-1; HASH_SIZE],
            prev: vec![-1; MAX_DISTANCE],
        }
    }

    fn hash(&self, pos: usize) -> usize {
        let d = self.data;
        let v = u32::from(d[pos]) << 16 | u32::from(d[pos + 1]) << 8 | u32::from(d[pos + 2]);
        (v.wrapping_mul(2654435761) >> (32 - HASH_BITS)) as usize
    }

    /// Records `pos` as a future match candidate.
    fn insert(&mut self, pos: usize) {
        if pos + MIN_MATCH > self.data.len() {
            return;
        }
        let h = self.hash(pos);
        self.prev[pos & (MAX_DISTANCE - 1)] = self.head[h];
        self.head[h] = pos as i32;
    }

    /// Longest match for `pos` as `(length, distance)`, or `None` when no
    /// candidate reaches [`MIN_MATCH`].
    fn longest_match(&self, pos: usize) -> Option<(usize, usize)> {
        let data = self.data;
        if pos + MIN_MATCH > data.len() {
            return None;
        }
        let limit = MAX_MATCH.min(data.len() - pos);
        let mut best_len = 0;
        let mut best_dist = 0;

        let mut candidate = self.head[self.hash(pos)];
        for _ in 0..MAX_PROBES {
            if candidate < 0 {
                break;
            }
            let cand = candidate as usize;
            // Recycled prev slots can surface stale positions; both guards
            // end the chain walk.
            if cand >= pos || pos - cand > MAX_DISTANCE {
                break;
            }
            let mut len = 0;
            while len < limit && data[cand + len] == data[pos + len] {
                len += 1;
            }
            if len >= MIN_MATCH && len > best_len {
                best_len = len;
                best_dist = pos - cand;
                if best_len == MAX_MATCH {
                    break;
                }
            }
            candidate = self.prev[cand & (MAX_DISTANCE - 1)];
        }

        (best_len >= MIN_MATCH).then_some((best_len, best_dist))
    }
}

/// Compresses `data` into an LZ10 block.
///
/// Always emits the 4-byte header (tag + 24-bit length) followed by
/// control-byte-prefixed groups of eight operations. Deterministic, and
/// [`super::decompress`] restores the input exactly.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let n = data.len();
    debug_assert!(n <= 0xFF_FFFF, "LZ10 length field is 24 bits");

    let mut out = Vec::with_capacity(n / 2 + 8);
    out.push(LZ10_TAG);
    out.extend_from_slice(&[n as u8, (n >> 8) as u8, (n >> 16) as u8]);
    if n == 0 {
        return out;
    }

    let mut finder = MatchFinder::new(data);
    let mut pos = 0usize;
    while pos < n {
        let flag_at = out.len();
        out.push(0);
        let mut flags = 0u8;
        for bit in 0..8 {
            if pos >= n {
                break;
            }
            if let Some((len, dist)) = finder.longest_match(pos) {
                flags |= 0x80 >> bit;
                let disp = dist - 1;
                out.push(((len - MIN_MATCH) as u8) << 4 | (disp >> 8) as u8);
                out.push((disp & 0xFF) as u8);
                // Every byte the match consumed is still a candidate for
                // later references.
                for covered in pos..pos + len {
                    finder.insert(covered);
                }
                pos += len;
            } else {
                out.push(data[pos]);
                finder.insert(pos);
                pos += 1;
            }
        }
        out[flag_at] = flags;
    }
    out
}
