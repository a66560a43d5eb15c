//! Index-range selection shared by rows and header columns.

use std::collections::BTreeSet;

use crate::scene::Modifiers;

/// Selected indices plus the anchor that shift-click ranges extend from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSelection {
    selected: BTreeSet<usize>,
    anchor: Option<usize>,
}

/// Body rows, by position in the displayed row list.
pub type RowSelection = IndexSelection;
/// Leaf columns, by display index.
pub type ColumnSelection = IndexSelection;

impl IndexSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn click(&mut self, index: usize, modifiers: Modifiers) {
        self.click_span(index, 1, modifiers);
    }

    /// Select `span` indices starting at `start`.
    ///
    /// Plain click replaces the selection; ctrl/cmd toggles the span; shift
    /// selects from the anchor through the span, added to the existing
    /// selection when ctrl/cmd is also held.
    pub fn click_span(&mut self, start: usize, span: usize, modifiers: Modifiers) {
        let span = span.max(1);
        let end = start + span;
        match self.anchor {
            Some(anchor) if modifiers.shift => {
                if !modifiers.toggle() {
                    self.selected.clear();
                }
                let (lo, hi) = if anchor < start {
                    (anchor, end)
                } else {
                    (start, anchor + 1)
                };
                self.selected.extend(lo..hi);
            }
            _ if modifiers.toggle() => {
                if (start..end).all(|i| self.selected.contains(&i)) {
                    for i in start..end {
                        self.selected.remove(&i);
                    }
                } else {
                    self.selected.extend(start..end);
                }
                self.anchor = Some(start);
            }
            _ => {
                self.selected.clear();
                self.selected.extend(start..end);
                self.anchor = Some(start);
            }
        }
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.anchor = None;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;

    fn ctrl() -> Modifiers {
        Modifiers {
            ctrl: true,
            ..Modifiers::default()
        }
    }

    fn shift() -> Modifiers {
        Modifiers {
            shift: true,
            ..Modifiers::default()
        }
    }

    fn ids(sel: &IndexSelection) -> Vec<usize> {
        sel.selected().iter().copied().collect()
    }

    #[test]
    fn test_click_replaces() {
        let mut sel = RowSelection::new();
        sel.click(3, Modifiers::default());
        sel.click(5, Modifiers::default());
        assert_eq!(ids(&sel), vec![5]);
    }

    #[test]
    fn test_ctrl_toggles() {
        let mut sel = RowSelection::new();
        sel.click(1, Modifiers::default());
        sel.click(4, ctrl());
        assert_eq!(ids(&sel), vec![1, 4]);
        sel.click(1, ctrl());
        assert_eq!(ids(&sel), vec![4]);
    }

    #[test]
    fn test_shift_extends_from_anchor() {
        let mut sel = RowSelection::new();
        sel.click(5, Modifiers::default());
        sel.click(2, shift());
        assert_eq!(ids(&sel), vec![2, 3, 4, 5]);
        sel.click(7, shift());
        assert_eq!(ids(&sel), vec![5, 6, 7]);
    }

    #[test]
    fn test_span_selects_group_columns() {
        let mut sel = ColumnSelection::new();
        sel.click_span(2, 3, Modifiers::default());
        assert_eq!(ids(&sel), vec![2, 3, 4]);
        sel.click_span(2, 3, ctrl());
        assert!(sel.is_empty());
    }
}
