//! Candidate sets for longest-match affix stripping

use rustc_hash::FxHashSet;

/// A set of affix candidates kept in longest-first order
///
/// Lookups walk the ordered list so the first hit is always the longest
/// candidate that matches. Ties in length are broken lexicographically so that
/// matching is deterministic regardless of insertion order.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    members: FxHashSet<String>,
    ordered: Vec<String>,
}

impl CandidateSet {
    /// Create an empty candidate set (nothing ever matches)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a candidate set from a list of strings
    ///
    /// Empty strings are ignored: an empty affix would match everywhere.
    pub fn from_list<S: AsRef<str>>(words: &[S]) -> Self {
        let mut set = Self::empty();
        set.extend(words.iter().map(|w| w.as_ref()));
        set
    }

    /// Add candidates to the set
    pub fn extend<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) {
        for word in words {
            if !word.is_empty() {
                self.members.insert(word.to_string());
            }
        }
        self.reorder();
    }

    /// Remove candidates from the set
    pub fn remove(&mut self, words: &[&str]) {
        for word in words {
            self.members.remove(*word);
        }
        self.reorder();
    }

    fn reorder(&mut self) {
        let mut ordered: Vec<String> = self.members.iter().cloned().collect();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        self.ordered = ordered;
    }

    /// Check membership
    pub fn contains(&self, word: &str) -> bool {
        self.members.contains(word)
    }

    /// Longest candidate that `text` starts with
    pub fn longest_prefix_of(&self, text: &str) -> Option<&str> {
        self.ordered
            .iter()
            .find(|c| text.starts_with(c.as_str()))
            .map(|c| c.as_str())
    }

    /// Longest candidate that `text` ends with
    pub fn longest_suffix_of(&self, text: &str) -> Option<&str> {
        self.ordered
            .iter()
            .find(|c| text.ends_with(c.as_str()))
            .map(|c| c.as_str())
    }

    /// Candidates that `text` starts with, longest first
    pub fn prefixes_of<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.ordered
            .iter()
            .filter(move |c| text.starts_with(c.as_str()))
            .map(|c| c.as_str())
    }

    /// Candidates in match order (longest first)
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(|c| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let words: Vec<S> = iter.into_iter().collect();
        Self::from_list(&words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_prefix_wins() {
        let set = CandidateSet::from_list(&["c", "ch", "cho"]);
        assert_eq!(set.longest_prefix_of("chol"), Some("cho"));
        assert_eq!(set.longest_prefix_of("chedy"), Some("ch"));
        assert_eq!(set.longest_prefix_of("daiin"), None);
    }

    #[test]
    fn test_longest_suffix_wins() {
        let set = CandidateSet::from_list(&["y", "dy", "edy"]);
        assert_eq!(set.longest_suffix_of("chedy"), Some("edy"));
        assert_eq!(set.longest_suffix_of("shody"), Some("dy"));
        assert_eq!(set.longest_suffix_of("chol"), None);
    }

    #[test]
    fn test_empty_strings_ignored() {
        let set = CandidateSet::from_list(&["", "ch"]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.longest_prefix_of("ol"), None);
    }

    #[test]
    fn test_equal_length_order_is_lexicographic() {
        let set: CandidateSet = ["sh", "ch", "qo"].into_iter().collect();
        let order: Vec<_> = set.iter().collect();
        assert_eq!(order, vec!["ch", "qo", "sh"]);
    }

    #[test]
    fn test_remove_and_prefixes_of() {
        let mut set = CandidateSet::from_list(&["o", "ol", "or"]);
        assert_eq!(set.prefixes_of("olor").collect::<Vec<_>>(), vec!["ol", "o"]);
        set.remove(&["ol"]);
        assert_eq!(set.longest_prefix_of("olor"), Some("o"));
        assert!(!set.contains("ol"));
    }
}
