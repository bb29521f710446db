//! Line predicates and formatters for BIND-style zone files.
//!
//! The editor never parses the full zone grammar. These string predicates
//! are the entire matching contract: a line either carries the SOA marker,
//! belongs to a given owner name, or is left alone.

/// Check if a line carries the zone's SOA declaration.
///
/// The serial number is expected on the line immediately following the
/// first line for which this returns true.
pub fn is_soa(line: &str) -> bool {
    line.contains("SOA")
}

/// Check if a line belongs to `owner`.
///
/// Matches the dot-suffixed form (`"<owner>."`), so an owner name that is
/// a string prefix of a longer owner name never matches the longer one's
/// lines. `owner` is passed without the trailing dot.
pub fn matches_owner(line: &str, owner: &str) -> bool {
    line.starts_with(&format!("{}.", owner))
}

/// Parse the serial number from the line following the SOA marker.
///
/// The serial is the first whitespace-delimited token of that line.
pub fn parse_serial(line: &str) -> Option<u32> {
    line.split_whitespace().next()?.parse().ok()
}

/// Format the rewritten serial line.
///
/// Left-padded to stay column-aligned with the rest of the SOA block in
/// the BIND zone template. Any other tokens of the original line are
/// discarded; only the value and the trailing comment are reconstructed.
pub fn format_serial_line(serial: u32) -> String {
    format!("                        {}      ; Serial number", serial)
}

/// Format a challenge TXT record line for `owner`.
pub fn format_txt_record(owner: &str, token: &str) -> String {
    format!("{}. IN TXT \"{}\"", owner, token)
}
