//! Helpers for the human-facing map names in the catalog, which are usually
//! written as `"<map> by <author>"`.

/// Splits `s` on `sep` from the right, performing at most `max_splits`
/// splits (`None` means no limit). Pieces come back in left-to-right order.
///
/// ```
/// use league_catalog::rsplit;
///
/// assert_eq!(rsplit("a by b by c", " by ", Some(1)), vec!["a by b", "c"]);
/// assert_eq!(rsplit("a by b by c", " by ", None), vec!["a", "b", "c"]);
/// assert_eq!(rsplit("plain", " by ", Some(1)), vec!["plain"]);
/// ```
pub fn rsplit<'a>(s: &'a str, sep: &str, max_splits: Option<usize>) -> Vec<&'a str> {
    let mut parts: Vec<&str> = match max_splits {
        Some(n) => s.rsplitn(n + 1, sep).collect(),
        None => s.rsplit(sep).collect(),
    };

    parts.reverse();
    parts
}

/// Strips a trailing `" by <author>"` credit from a map name. Very long
/// "author" parts are assumed to be part of the name itself and kept.
pub fn clean_map_name(name: &str) -> &str {
    match rsplit(name, " by ", Some(1)).as_slice() {
        [map, author] if author.chars().count() <= 100 => *map,
        _ => name,
    }
}
