//! Minimal change-notification signal with explicit subscription handles.
//!
//! Listeners are removed when their [`Subscription`] is dropped or
//! unsubscribed, so a host that goes away stops receiving notifications
//! without the signal having to know about it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// A multi-listener notification source.
pub struct Signal<T> {
    inner: Rc<RefCell<Listeners<T>>>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Notify every listener. Listeners may subscribe or unsubscribe while
    /// being notified; changes take effect on the next emit.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, f)| Rc::clone(f))
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

impl<T: 'static> Signal<T> {
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.entries.push((id, Rc::new(f)));
            id
        };
        let weak: Weak<RefCell<Listeners<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().entries.retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }
}

/// Cleanup handle returned by [`Signal::subscribe`].
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the listener registered for the lifetime of the signal.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_subscribers() {
        let signal: Signal<u32> = Signal::new();
        let total = Rc::new(Cell::new(0));
        let t = Rc::clone(&total);
        let _sub = signal.subscribe(move |v| t.set(t.get() + v));
        signal.emit(&3);
        signal.emit(&4);
        assert_eq!(total.get(), 7);
    }

    #[test]
    fn test_unsubscribe_and_drop() {
        let signal: Signal<()> = Signal::new();
        let hits = Rc::new(Cell::new(0));
        let h1 = Rc::clone(&hits);
        let h2 = Rc::clone(&hits);
        let a = signal.subscribe(move |()| h1.set(h1.get() + 1));
        let b = signal.subscribe(move |()| h2.set(h2.get() + 10));
        assert_eq!(signal.listener_count(), 2);

        a.unsubscribe();
        signal.emit(&());
        assert_eq!(hits.get(), 10);

        drop(b);
        signal.emit(&());
        assert_eq!(hits.get(), 10);
        assert_eq!(signal.listener_count(), 0);
    }

    #[test]
    fn test_detach_keeps_listener() {
        let signal: Signal<()> = Signal::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        signal.subscribe(move |()| h.set(h.get() + 1)).detach();
        signal.emit(&());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_subscription_outliving_signal() {
        let signal: Signal<()> = Signal::new();
        let sub = signal.subscribe(|()| {});
        drop(signal);
        sub.unsubscribe();
    }
}
