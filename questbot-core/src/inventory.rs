//! Player inventory: item name to positive count.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Counted bag of item names. A zero count is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: BTreeMap<String, u32>,
}

impl Inventory {
    /// Empty inventory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `item`.
    pub fn take(&mut self, item: &str) {
        *self.items.entry(item.to_string()).or_insert(0) += 1;
    }

    /// Remove one unit of `item`, dropping the entry at zero.
    ///
    /// # Errors
    /// `CoreError::ItemNotHeld` if the item is absent.
    pub fn give(&mut self, item: &str) -> Result<()> {
        let Some(count) = self.items.get_mut(item) else {
            return Err(CoreError::ItemNotHeld(item.to_string()));
        };
        *count -= 1;
        if *count == 0 {
            self.items.remove(item);
        }
        Ok(())
    }

    /// Units of `item` held.
    #[must_use]
    pub fn count(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    /// Whether at least one unit is held.
    #[must_use]
    pub fn contains(&self, item: &str) -> bool {
        self.count(item) > 0
    }

    /// `(name, count)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_then_give_drops_entry() {
        let mut inv = Inventory::new();
        inv.take("Amulet");
        inv.take("Amulet");
        assert_eq!(inv.count("Amulet"), 2);
        inv.give("Amulet").expect("held");
        assert_eq!(inv.count("Amulet"), 1);
        inv.give("Amulet").expect("held");
        assert!(!inv.contains("Amulet"));
        assert!(inv.is_empty());
    }

    #[test]
    fn give_absent_item_fails() {
        let mut inv = Inventory::new();
        let err = inv.give("Sword").expect_err("absent");
        assert!(matches!(err, CoreError::ItemNotHeld(ref n) if n == "Sword"));
    }

    #[test]
    fn iter_is_name_ordered() {
        let mut inv = Inventory::new();
        inv.take("Torch");
        inv.take("Apple");
        let names: Vec<&str> = inv.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Apple", "Torch"]);
    }
}
