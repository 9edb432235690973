//! Subject code extraction from event tags.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Offering tag such as `COSC262-24S1` or `SENG201-2024S2`.
/// The first capture group is the subject code.
static OFFERING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]{4}[0-9]{3})-(?:[0-9]{2}|[0-9]{4})S[0-9]$").expect("valid offering regex")
});

/// Return the subject code of the first tag shaped like a course offering,
/// or an empty string when no tag qualifies.
pub fn classify(tags: &BTreeSet<String>) -> String {
    tags.iter()
        .find_map(|tag| OFFERING_TAG.captures(tag))
        .and_then(|caps| caps.get(1))
        .map(|code| code.as_str().to_string())
        .unwrap_or_default()
}
