/// Tab operations: ordering and uniqueness

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::classifier::{canonicalize, is_file_url, mega_priority_rank};
use crate::tab_data::TabInfo;

/// Everything the comparator looks at, computed once per tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub rank: Option<usize>,
    pub file: bool,
    pub audible: bool,
    pub canonical: String,
}

impl SortKey {
    pub fn for_tab<S: AsRef<str>>(tab: &TabInfo, priority: &[S]) -> SortKey {
        let url = tab.url_str();
        SortKey {
            rank: mega_priority_rank(url, priority),
            file: is_file_url(url),
            audible: tab.audible,
            canonical: canonicalize(url),
        }
    }
}

/// Audible tabs first
fn audible_first(a: bool, b: bool) -> Ordering {
    b.cmp(&a)
}

/// Order two tabs by the sort policy
///
/// Ranked (mega-priority) tabs always come before unranked ones. Among ranked
/// tabs: rank, then audible, then canonical URL. Among unranked tabs:
/// file:// first, then audible, then canonical URL. The file tier is
/// deliberately absent from the ranked branch.
pub fn compare_tabs(a: &SortKey, b: &SortKey) -> Ordering {
    match (a.rank, b.rank) {
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(rank_a), Some(rank_b)) => rank_a
            .cmp(&rank_b)
            .then_with(|| audible_first(a.audible, b.audible))
            .then_with(|| a.canonical.cmp(&b.canonical)),
        (None, None) => b
            .file
            .cmp(&a.file)
            .then_with(|| audible_first(a.audible, b.audible))
            .then_with(|| a.canonical.cmp(&b.canonical)),
    }
}

/// Sort tabs by the sort policy (precompute keys for each tab)
///
/// The sort is stable: tabs that compare equal keep their input order.
pub fn sort_tabs<S: AsRef<str>>(tabs: &[TabInfo], priority: &[S]) -> Vec<TabInfo> {
    let mut keyed: Vec<(TabInfo, SortKey)> = tabs
        .iter()
        .map(|tab| (tab.clone(), SortKey::for_tab(tab, priority)))
        .collect();

    keyed.sort_by(|a, b| compare_tabs(&a.1, &b.1));

    keyed.into_iter().map(|(tab, _)| tab).collect()
}

/// Result of splitting tabs into first occurrences and repeats
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deduplicated {
    /// First tab seen for each canonical URL, in input order
    pub keep: Vec<TabInfo>,
    /// Every later tab whose canonical URL was already seen
    pub duplicates: Vec<TabInfo>,
}

/// Make tabs unique by canonical URL (keep first occurrence)
///
/// Blank tabs all share the "" key, so only the first blank tab is kept.
pub fn deduplicate(tabs: &[TabInfo]) -> Deduplicated {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut result = Deduplicated::default();

    for tab in tabs {
        if seen_urls.insert(canonicalize(tab.url_str())) {
            result.keep.push(tab.clone());
        } else {
            result.duplicates.push(tab.clone());
        }
    }

    result
}
