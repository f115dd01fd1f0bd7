//! Outreach priority ordering.

use std::cmp::Ordering;

use crate::domain::ProspectProfile;

/// Priority order: capacity score descending, then alignment level descending,
/// then company name and ticker ascending.
///
/// Total over all profiles (NaN scores are ordered by `f64::total_cmp`), so the
/// ranking is reproducible for identical inputs.
pub fn compare_priority(a: &ProspectProfile, b: &ProspectProfile) -> Ordering {
    b.capacity
        .score
        .total_cmp(&a.capacity.score)
        .then_with(|| b.alignment.level.cmp(&a.alignment.level))
        .then_with(|| a.identity.name.cmp(&b.identity.name))
        .then_with(|| a.ticker.cmp(&b.ticker))
}

/// Rank profiles for outreach. The profiles themselves are left untouched.
pub fn rank_profiles(profiles: &[ProspectProfile]) -> Vec<&ProspectProfile> {
    let mut ranked: Vec<&ProspectProfile> = profiles.iter().collect();
    ranked.sort_by(|a, b| compare_priority(a, b));
    ranked
}

/// The first `top_n` of the ranking (`0` keeps everything).
pub fn rank_top(profiles: &[ProspectProfile], top_n: usize) -> Vec<&ProspectProfile> {
    let mut ranked = rank_profiles(profiles);
    if top_n > 0 {
        ranked.truncate(top_n);
    }
    ranked
}
