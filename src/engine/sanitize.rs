//! Log sanitizing before emission.

use crate::utils::config::CIRCLE_SHA1_MARKER;

/// Drop every `\n`-delimited line containing `CIRCLE_SHA1=` and rejoin the rest with `\n`.
///
/// Exactly filter-then-rejoin: empty leading/trailing segments survive, so `b"a\n"` stays
/// `b"a\n"` and input made only of marker lines becomes empty.
pub fn sanitize(input: &[u8]) -> Vec<u8> {
    let kept: Vec<&[u8]> = input
        .split(|&b| b == b'\n')
        .filter(|line| !contains(line, CIRCLE_SHA1_MARKER))
        .collect();
    kept.join(&b'\n')
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
