/// Rank given to missing or unrecognised administrative classifications.
pub const UNKNOWN_RANK: u8 = 99;

/// REGIC classes from most to least influential.  Matched as substrings in
/// order, so longer names must precede the names they contain.
const RANK_TABLE: [(&str, u8); 11] = [
    ("grande metrópole nacional", 1),
    ("metrópole nacional", 2),
    ("metrópole", 3),
    ("capital regional a", 4),
    ("capital regional b", 5),
    ("capital regional c", 6),
    ("centro sub-regional a", 7),
    ("centro sub-regional b", 8),
    ("centro de zona a", 9),
    ("centro de zona b", 10),
    ("centro local", 11),
];

/// Ordinal of an administrative classification label (lower = more influential).
pub fn rank_of(label: &str) -> u8 {
    let label = label.trim().to_lowercase();
    if label.is_empty() { return UNKNOWN_RANK }
    RANK_TABLE.iter()
        .find(|(name, _)| label.contains(name))
        .map_or(UNKNOWN_RANK, |&(_, rank)| rank)
}
