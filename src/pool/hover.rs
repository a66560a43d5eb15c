use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::types::CellKey;

/// Hovered header cells, keyed by the same identity the pool uses. Entries
/// are pruned when their cell leaves the visible set.
#[derive(Debug, Clone, Default)]
pub struct HoverTable(Rc<RefCell<HashSet<CellKey>>>);

impl HoverTable {
    pub fn enter(&self, key: CellKey) {
        self.0.borrow_mut().insert(key);
    }

    pub fn leave(&self, key: CellKey) {
        self.0.borrow_mut().remove(&key);
    }

    pub fn contains(&self, key: CellKey) -> bool {
        self.0.borrow().contains(&key)
    }

    pub fn retain(&self, keep: impl Fn(&CellKey) -> bool) {
        self.0.borrow_mut().retain(|k| keep(k));
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}
