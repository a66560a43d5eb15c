//! Derived values recomputed only when their input changes.

use std::rc::Rc;

/// Memo input compared by pointer rather than by value.
#[derive(Debug)]
pub struct Shared<T>(pub Rc<T>);

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Caches `f(input)` until called with an input that compares unequal.
#[derive(Debug)]
pub struct Memo<I, O> {
    slot: Option<(I, O)>,
    computations: u64,
}

impl<I, O> Default for Memo<I, O> {
    fn default() -> Self {
        Self {
            slot: None,
            computations: 0,
        }
    }
}

impl<I: PartialEq, O> Memo<I, O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(&mut self, input: I, f: impl FnOnce(&I) -> O) -> &O {
        let stale = self.slot.as_ref().map_or(true, |(prev, _)| *prev != input);
        if stale {
            self.slot = None;
            self.computations += 1;
        }
        let (_, out) = self.slot.get_or_insert_with(|| {
            let out = f(&input);
            (input, out)
        });
        out
    }

    /// Last computed value, if any.
    pub fn get(&self) -> Option<&O> {
        self.slot.as_ref().map(|(_, out)| out)
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    /// How many times the value has been computed.
    pub fn computations(&self) -> u64 {
        self.computations
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

    #[test]
    fn test_recomputes_only_on_change() {
        let mut memo: Memo<Vec<u32>, u32> = Memo::new();
        assert_eq!(*memo.get_or_compute(vec![1, 2], |v| v.iter().sum()), 3);
        assert_eq!(*memo.get_or_compute(vec![1, 2], |_| 0), 3);
        assert_eq!(memo.computations(), 1);
        assert_eq!(*memo.get_or_compute(vec![4], |v| v.iter().sum()), 4);
        assert_eq!(memo.computations(), 2);
    }

    #[test]
    fn test_shared_compares_pointers() {
        let a = Rc::new(vec![1]);
        let b = Rc::new(vec![1]);
        let mut memo: Memo<Shared<Vec<i32>>, usize> = Memo::new();
        memo.get_or_compute(Shared(Rc::clone(&a)), |v| v.0.len());
        memo.get_or_compute(Shared(Rc::clone(&a)), |v| v.0.len());
        assert_eq!(memo.computations(), 1);
        memo.get_or_compute(Shared(b), |v| v.0.len());
        assert_eq!(memo.computations(), 2);
    }

    #[test]
    fn test_invalidate() {
        let mut memo: Memo<u8, u8> = Memo::new();
        memo.get_or_compute(1, |v| v + 1);
        memo.invalidate();
        assert!(memo.get().is_none());
        assert_eq!(*memo.get_or_compute(1, |v| v + 10), 11);
    }
}
