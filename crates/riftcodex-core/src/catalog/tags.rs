//! Tag whitelist applied when tags are surfaced to callers.
//!
//! Upstream adds tags (item categories, experimental labels) from patch to
//! patch. Only this fixed set ever reaches a caller.

/// Tags a caller can see, compared case-insensitively
pub const ALLOWED_TAGS: [&str; 6] = ["FIGHTER", "ASSASSIN", "MARKSMAN", "MAGE", "TANK", "SUPPORT"];

pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.iter().any(|allowed| allowed.eq_ignore_ascii_case(tag))
}

/// Keep allowed tags, in their upstream casing and order
pub fn filter_allowed(tags: Vec<String>) -> Vec<String> {
    tags.into_iter().filter(|tag| is_allowed_tag(tag)).collect()
}
