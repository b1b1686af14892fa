/// Formats a duration in milliseconds as `H:MM:SS.mmm`, `M:SS.mmm` or
/// `S.mmm`, whichever is shortest without dropping a non-zero unit.
pub fn format_record_time(ms: i64) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.unsigned_abs();

    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;

    if hours > 0 {
        format!("{sign}{hours}:{minutes:02}:{seconds:02}.{millis:03}")
    } else if minutes > 0 {
        format!("{sign}{minutes}:{seconds:02}.{millis:03}")
    } else {
        format!("{sign}{seconds}.{millis:03}")
    }
}

/// Formats a flag hold as `M:SS.mmm`. Minutes are never rolled into hours
/// so totals from long matches stay comparable at a glance.
pub fn format_hold_time(ms: i64) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.unsigned_abs();

    format!("{sign}{}:{:02}.{:03}", ms / 60_000, (ms % 60_000) / 1000, ms % 1000)
}
