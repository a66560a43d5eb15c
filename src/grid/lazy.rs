//! Rows produced on demand by an accessor and memoised per index.

use std::collections::HashMap;

use serde_json::Value;

type Loader = Box<dyn Fn(usize) -> Value>;

/// A row source of known length whose rows are built only when read.
pub struct LazyRows {
    len: usize,
    load: Loader,
    rows: HashMap<usize, Value>,
}

impl LazyRows {
    pub fn new(len: usize, load: impl Fn(usize) -> Value + 'static) -> Self {
        Self {
            len,
            load: Box::new(load),
            rows: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Row `index`, loading it on first access. `None` past the end.
    pub fn get(&mut self, index: usize) -> Option<&Value> {
        if index >= self.len {
            return None;
        }
        let load = &self.load;
        Some(self.rows.entry(index).or_insert_with(|| load(index)))
    }

    /// Rows loaded so far.
    pub fn loaded(&self) -> usize {
        self.rows.len()
    }

    /// Drop the memoised row so the next read reloads it.
    pub fn invalidate(&mut self, index: usize) {
        self.rows.remove(&index);
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.rows.retain(|&i, _| i < len);
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Load every row in `range` and return them in order.
    pub fn materialize(&mut self, range: std::ops::Range<usize>) -> Vec<Value> {
        range
            .filter_map(|i| self.get(i).cloned())
            .collect()
    }
}

impl std::fmt::Debug for LazyRows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyRows")
            .field("len", &self.len)
            .field("loaded", &self.rows.len())
            .finish_non_exhaustive()
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
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_loads_once_per_row() {
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let mut rows = LazyRows::new(1000, move |i| {
            c.set(c.get() + 1);
            json!({ "id": i })
        });
        assert_eq!(rows.get(7).unwrap()["id"], 7);
        assert_eq!(rows.get(7).unwrap()["id"], 7);
        assert_eq!(calls.get(), 1);
        assert_eq!(rows.loaded(), 1);
        assert!(rows.get(1000).is_none());
    }

    #[test]
    fn test_invalidate_and_shrink() {
        let mut rows = LazyRows::new(10, |i| json!(i));
        let window = rows.materialize(2..5);
        assert_eq!(window, vec![json!(2), json!(3), json!(4)]);
        rows.invalidate(3);
        assert_eq!(rows.loaded(), 2);
        rows.set_len(3);
        assert_eq!(rows.loaded(), 1);
    }
}
