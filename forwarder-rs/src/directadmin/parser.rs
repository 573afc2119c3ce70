//! DirectAdmin forwarder list parser
//!
//! `CMD_API_EMAIL_FORWARDERS` answers with a URL-encoded, `&`-joined list of
//! `alias=destinations` pairs, for example:
//!
//! ```text
//! sales=alice%40example.com%2Cbob%40example.com&info=carol%40example.net
//! ```
//!
//! Status markers (`error=0`, `error=1`) may appear on their own or
//! interleaved with the data. The format is undocumented, so the parser is
//! lenient: anything it cannot read is skipped, never reported.

use percent_encoding::percent_decode_str;
use std::collections::BTreeSet;
use tracing::debug;

use super::types::Forwarder;

/// Body the panel sends when the domain has no forwarders
const EMPTY_SENTINEL: &str = "error=1";

/// Prefix of inline status markers
const STATUS_PREFIX: &str = "error=";

/// Marker for a successful create/delete
const SUCCESS_MARKER: &str = "error=0";

/// Parse a forwarder list body into records, in panel order
pub fn parse_forwarders(raw: &str) -> Vec<Forwarder> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == EMPTY_SENTINEL {
        return Vec::new();
    }

    let decoded = percent_decode_str(trimmed).decode_utf8_lossy();

    let mut forwarders = Vec::new();
    for entry in decoded.split('&') {
        match parse_entry(entry) {
            Some(forwarder) => forwarders.push(forwarder),
            None => debug!("Skipping forwarder entry: {:?}", entry),
        }
    }

    forwarders
}

/// Parse one decoded `alias=destinations` pair
fn parse_entry(entry: &str) -> Option<Forwarder> {
    if entry.starts_with(STATUS_PREFIX) {
        return None;
    }

    // Destinations may contain '=' themselves; only the first one separates
    let (raw_alias, raw_destinations) = entry.split_once('=')?;

    let alias = match raw_alias.split_once('@') {
        Some((local, _domain)) => local,
        None => raw_alias,
    }
    .trim();

    if alias.is_empty() || raw_destinations.is_empty() {
        return None;
    }

    let destinations: Vec<String> = raw_destinations
        .split(',')
        .map(str::trim)
        .filter(|dest| !dest.is_empty())
        .map(str::to_string)
        .collect();

    if destinations.is_empty() {
        return None;
    }

    Some(Forwarder {
        alias: alias.to_string(),
        destinations,
    })
}

/// Whether a create/delete reply means the panel applied the change
pub fn is_success(status: u16, body: &str) -> bool {
    (200..300).contains(&status) && body.contains(SUCCESS_MARKER)
}

/// Every destination already in use, sorted and de-duplicated
///
/// Addresses containing `exclude` (the panel account name) are left out so
/// the account's own mailbox is not offered as a target. This is a plain
/// substring match: an `exclude` of `"admin"` also hides `sysadmin@...`.
pub fn suggested_destinations(forwarders: &[Forwarder], exclude: &str) -> Vec<String> {
    let unique: BTreeSet<&str> = forwarders
        .iter()
        .flat_map(|fwd| fwd.destinations.iter())
        .map(String::as_str)
        .filter(|dest| exclude.is_empty() || !dest.contains(exclude))
        .collect();

    unique.into_iter().map(str::to_string).collect()
}
