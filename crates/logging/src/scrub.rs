// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Runner Agent Contributors

//! Overlap-safe secret scrubbing.

/// Token substituted for every masked span.
pub const MASK_TOKEN: &[u8] = b"[MASKED]";

/// Replace every occurrence of any `pattern` in `input` with [`MASK_TOKEN`].
///
/// Overlapping matches are merged into a single maximal span before
/// substitution, so when two patterns overlap the longer one determines
/// the full extent of what gets masked rather than leaving a shorter
/// match's uncovered tail exposed.
pub fn scrub(input: &[u8], patterns: &[Vec<u8>]) -> Vec<u8> {
    if input.is_empty() {
        return Vec::new();
    }

    let mut spans = Vec::new();
    for pattern in patterns {
        if pattern.is_empty() || pattern.len() > input.len() {
            continue;
        }
        let mut start = 0;
        while start + pattern.len() <= input.len() {
            match input[start..]
                .windows(pattern.len())
                .position(|w| w == pattern.as_slice())
            {
                Some(pos) => {
                    let abs = start + pos;
                    spans.push((abs, abs + pattern.len()));
                    start = abs + 1;
                }
                None => break,
            }
        }
    }

    if spans.is_empty() {
        return input.to_vec();
    }

    spans.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (s, e) in spans {
        match merged.last_mut() {
            Some(last) if s <= last.1 => {
                if e > last.1 {
                    last.1 = e;
                }
            }
            _ => merged.push((s, e)),
        }
    }

    let mut out = Vec::with_capacity(input.len());
    let mut cursor = 0;
    for (s, e) in merged {
        out.extend_from_slice(&input[cursor..s]);
        out.extend_from_slice(MASK_TOKEN);
        cursor = e;
    }
    out.extend_from_slice(&input[cursor..]);
    out
}
