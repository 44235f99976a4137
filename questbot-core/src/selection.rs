//! Resolve a player's free-text choice against a candidate list.
//!
//! Menus put entity names into button labels, sometimes with a verb in
//! front ("Talk to Mira") or markers behind ("Lost ring ✅"). One resolver
//! covers every entity kind; the caller picks the [`MatchRule`].

use crate::snapshot::EnemyEncounter;
use crate::world::{DirectionDef, NpcDef, QuestDef};

/// Anything a player can pick by name.
pub trait Named {
    /// Name as it appears in menus.
    fn name(&self) -> &str;
}

impl Named for NpcDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for QuestDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for EnemyEncounter {
    fn name(&self) -> &str {
        &self.def.name
    }
}

impl Named for DirectionDef {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for String {
    fn name(&self) -> &str {
        self
    }
}

/// How the raw text must relate to a candidate's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRule {
    /// Text equals the name.
    Exact,
    /// Text starts with the name (markers may follow).
    Prefix,
    /// Text ends with the name (a verb may precede).
    Suffix,
}

impl MatchRule {
    fn matches(self, text: &str, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        match self {
            Self::Exact => text == name,
            Self::Prefix => text.starts_with(name),
            Self::Suffix => text.ends_with(name),
        }
    }
}

/// Candidate whose name matches the trimmed `raw` text under `rule`.
///
/// The longest matching name wins, so "Talk to Old Tom" picks "Old Tom"
/// over "Tom". Equal lengths keep candidate order.
pub fn resolve<'a, T: Named>(candidates: &'a [T], raw: &str, rule: MatchRule) -> Option<&'a T> {
    resolve_index(candidates, raw, rule).and_then(|i| candidates.get(i))
}

/// Index form of [`resolve`], for callers that need to mutate the match.
pub fn resolve_index<T: Named>(candidates: &[T], raw: &str, rule: MatchRule) -> Option<usize> {
    let text = raw.trim();
    let mut best: Option<(usize, usize)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        let name = candidate.name();
        if rule.matches(text, name) && best.is_none_or(|(_, len)| name.len() > len) {
            best = Some((i, name.len()));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn suffix_ignores_leading_verb() {
        let npcs = names(&["Mira", "Old Tom"]);
        assert_eq!(resolve(&npcs, "Talk to Old Tom", MatchRule::Suffix).map(String::as_str), Some("Old Tom"));
        assert!(resolve(&npcs, "Old Tom, please", MatchRule::Suffix).is_none());
    }

    #[test]
    fn prefix_ignores_trailing_markers() {
        let quests = names(&["Lost ring", "Wolves"]);
        assert_eq!(resolve(&quests, "Lost ring ✅", MatchRule::Prefix).map(String::as_str), Some("Lost ring"));
        assert!(resolve(&quests, "The Lost ring", MatchRule::Prefix).is_none());
    }

    #[test]
    fn exact_requires_whole_name_after_trim() {
        let enemies = names(&["Rat", "Rat king"]);
        assert_eq!(resolve(&enemies, "  Rat king ", MatchRule::Exact).map(String::as_str), Some("Rat king"));
        assert!(resolve(&enemies, "Rat kin", MatchRule::Exact).is_none());
    }

    #[test]
    fn longest_match_wins() {
        let givers = names(&["Tom", "Old Tom"]);
        assert_eq!(resolve_index(&givers, "Talk to Old Tom", MatchRule::Suffix), Some(1));
        assert_eq!(resolve_index(&givers, "Talk to Tom", MatchRule::Suffix), Some(0));

        let quests = names(&["Wolf", "Wolf hunt"]);
        assert_eq!(resolve(&quests, "Wolf hunt ⚔️", MatchRule::Prefix).map(String::as_str), Some("Wolf hunt"));
        assert_eq!(resolve(&quests, "Wolf ⚔️", MatchRule::Prefix).map(String::as_str), Some("Wolf"));
    }

    #[test]
    fn equal_names_keep_candidate_order() {
        let list = names(&["Mira", "Mira"]);
        assert_eq!(resolve_index(&list, "Talk to Mira", MatchRule::Suffix), Some(0));
    }

    #[test]
    fn empty_names_never_match() {
        let list = names(&["", "Mira"]);
        assert_eq!(resolve_index(&list, "Mira", MatchRule::Suffix), Some(1));
    }
}
