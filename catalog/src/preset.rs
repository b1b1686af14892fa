//! Presets carry the map they were generated for inside an `M` block:
//! `M`, a length marker, then `f` followed by the map ID in base 52.
//!
//! A catalog row is only trusted when re-injecting its map ID into its preset
//! leaves the preset unchanged.

/// Digit alphabet shared by the ID encoding and the length marker.
pub const ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Position of `c` within [`ALPHABET`], if it's in there at all.
fn alphabet_index(c: char) -> Option<usize> {
    if !c.is_ascii() {
        return None;
    }

    ALPHABET.iter().position(|&d| d == c as u8)
}

/// Encodes `n` in base 52, most significant digit first. Zero is `"a"`.
pub fn encode_base52(mut n: u64) -> String {
    if n == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut digits = Vec::new();
    while n > 0 {
        digits.push(ALPHABET[(n % 52) as usize]);
        n /= 52;
    }

    digits.iter().rev().map(|&d| d as char).collect()
}

/// The full block for `map_id`, e.g. `"Mcfa"` for map 0.
pub fn injected_block(map_id: u64) -> String {
    let inner = format!("f{}", encode_base52(map_id));

    // A u64 needs at most 12 base-52 digits, so the marker always fits.
    let marker = ALPHABET[inner.len()] as char;

    format!("M{marker}{inner}")
}

/// Replaces the first `M` block of `preset` with the block for `map_id`.
///
/// A preset without any `M` is returned unchanged. Returns `None` when the
/// character after `M` isn't a valid length marker.
pub fn inject_map_id(preset: &str, map_id: u64) -> Option<String> {
    let Some(pos) = preset.find('M') else {
        return Some(preset.to_string());
    };

    let marker = preset[pos + 1..].chars().next()?;
    let old_len = alphabet_index(marker)?;

    // A short preset simply loses its tail.
    let end = pos + 2 + old_len;
    let tail = if end >= preset.len() { "" } else { preset.get(end..)? };

    Some(format!("{}{}{}", &preset[..pos], injected_block(map_id), tail))
}

/// Parses a catalog map ID. Only plain non-negative base-10 integers count.
pub fn parse_map_id(map_id: &str) -> Option<u64> {
    let map_id = map_id.trim();

    if map_id.is_empty() || !map_id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    map_id.parse().ok()
}

/// Whether `preset` already embeds `map_id` byte for byte.
pub fn embeds_map_id(preset: &str, map_id: u64) -> bool {
    inject_map_id(preset, map_id).is_some_and(|injected| injected.as_bytes() == preset.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base52_digits() {
        assert_eq!(encode_base52(0), "a");
        assert_eq!(encode_base52(1), "b");
        assert_eq!(encode_base52(51), "Z");
        assert_eq!(encode_base52(52), "ba");
        assert_eq!(encode_base52(52 * 52 + 3), "bad");
    }

    #[test]
    fn block_for_map_zero() {
        // inner is "fa", length 2, so the marker is 'c'.
        assert_eq!(injected_block(0), "Mcfa");
    }

    #[test]
    fn block_for_larger_id() {
        // 77 = 1 * 52 + 25 -> "bz", inner "fbz" has length 3 -> 'd'.
        assert_eq!(injected_block(77), "Mdfbz");
    }

    #[test]
    fn matching_preset_validates() {
        assert!(embeds_map_id("XMcfaY", 0));
        assert!(embeds_map_id("abcMdfbzrest", 77));
    }

    #[test]
    fn wrong_digits_are_rejected() {
        assert!(!embeds_map_id("XMcfbY", 0));
        assert!(!embeds_map_id("XMcfaY", 1));
    }

    #[test]
    fn stale_length_marker_is_rejected() {
        // Old block claims three inner chars; re-injection shortens it.
        assert_eq!(inject_map_id("XMdfaaY", 0).as_deref(), Some("XMcfaY"));
        assert!(!embeds_map_id("XMdfaaY", 0));
    }

    #[test]
    fn preset_without_block_passes_through() {
        assert_eq!(inject_map_id("nothing here", 5).as_deref(), Some("nothing here"));
        assert!(embeds_map_id("nothing here", 5));
    }

    #[test]
    fn bad_marker_is_rejected() {
        assert_eq!(inject_map_id("XM", 0), None);
        assert_eq!(inject_map_id("XM9fa", 0), None);
        assert!(!embeds_map_id("XM9fa", 0));
    }

    #[test]
    fn truncated_block_does_not_validate() {
        assert_eq!(inject_map_id("XMz", 0).as_deref(), Some("XMcfa"));
        assert!(!embeds_map_id("XMz", 0));
    }

    #[test]
    fn map_id_parsing() {
        assert_eq!(parse_map_id("0"), Some(0));
        assert_eq!(parse_map_id(" 77 "), Some(77));
        assert_eq!(parse_map_id(""), None);
        assert_eq!(parse_map_id("-3"), None);
        assert_eq!(parse_map_id("12abc"), None);
    }
}
