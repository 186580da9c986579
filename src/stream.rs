use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

/// A cancellation handle returned by [`Output::subscribe`].
///
/// Dropping the handle removes the listener; keep it alive for as long as the
/// subscription should receive values.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Subscription")
    }
}

type Listener<T> = Rc<RefCell<dyn FnMut(T)>>;

struct StreamCore<T> {
    /// Last pushed value, kept only for replaying cells.
    value: RefCell<Option<T>>,
    replay: bool,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    slot: RefCell<Option<Box<dyn FnMut(T)>>>,
    next_id: Cell<u64>,
}

impl<T: Clone> StreamCore<T> {
    fn notify(&self, value: T) {
        // Snapshot so listeners may subscribe/unsubscribe mid-delivery
        // without aborting the pass. Registration order is preserved.
        let snapshot: Vec<Listener<T>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            (listener.borrow_mut())(value.clone());
        }

        // The slot callback may re-attach itself while running; only restore
        // it when it has not been replaced.
        let taken = self.slot.borrow_mut().take();
        if let Some(mut callback) = taken {
            callback(value.clone());
            let mut slot = self.slot.borrow_mut();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }

        if self.replay {
            *self.value.borrow_mut() = Some(value);
        }
    }
}

/// A push-based cell that callers feed values into.
///
/// Two flavors exist:
/// - stateful ([`Input::new`]): `next` notifies listeners in registration
///   order, then stores the value so later subscribers receive it immediately
///   (replay-last).
/// - cold ([`Input::cold`]): nothing is stored; only listeners registered at
///   push time see a value. Used for one-shot command streams.
///
/// All delivery is synchronous: by the time `next` returns, every listener
/// has observed the value.
pub struct Input<T> {
    core: Rc<StreamCore<T>>,
}

impl<T> Clone for Input<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T: Clone> Input<T> {
    pub fn new(initial: T) -> Self {
        Self {
            core: Rc::new(StreamCore {
                value: RefCell::new(Some(initial)),
                replay: true,
                listeners: RefCell::new(Vec::new()),
                slot: RefCell::new(None),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Creates a non-replaying cell for transient commands.
    pub fn cold() -> Self {
        Self {
            core: Rc::new(StreamCore {
                value: RefCell::new(None),
                replay: false,
                listeners: RefCell::new(Vec::new()),
                slot: RefCell::new(None),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Pushes a value, synchronously notifying every listener.
    pub fn next(&self, value: T) {
        self.core.notify(value);
    }

    /// Pushes only when the value differs from the stored one.
    ///
    /// On a cold cell this behaves like [`Input::next`].
    pub fn next_if_changed(&self, value: T)
    where
        T: PartialEq,
    {
        if self.core.replay {
            let same = self.core.value.borrow().as_ref() == Some(&value);
            if same {
                return;
            }
        }
        self.core.notify(value);
    }

    /// Returns the stored value of a replaying cell.
    pub fn get(&self) -> Option<T> {
        self.core.value.borrow().clone()
    }

    /// Read-only view of this cell.
    pub fn output(&self) -> Output<T> {
        Output {
            core: Rc::clone(&self.core),
        }
    }
}

/// A read-only subscription view of an [`Input`].
///
/// Besides plain [`Output::subscribe`], an output carries one "external slot":
/// [`Output::attach`] replaces whatever callback was attached before instead
/// of accumulating subscribers. Host UIs that re-declare their callback on
/// every render use the slot so repeated registration neither leaks nor
/// double-fires.
pub struct Output<T> {
    core: Rc<StreamCore<T>>,
}

impl<T> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T: Clone + 'static> Output<T> {
    /// Registers a listener; replays the stored value first on stateful cells.
    pub fn subscribe(&self, f: impl FnMut(T) + 'static) -> Subscription {
        let id = self.core.next_id.get();
        self.core.next_id.set(id.wrapping_add(1));

        let listener: Listener<T> = Rc::new(RefCell::new(f));
        if self.core.replay {
            let current = self.core.value.borrow().clone();
            if let Some(value) = current {
                (listener.borrow_mut())(value);
            }
        }
        self.core.listeners.borrow_mut().push((id, listener));

        let weak: Weak<StreamCore<T>> = Rc::downgrade(&self.core);
        Subscription::new(move || {
            if let Some(core) = weak.upgrade() {
                core.listeners.borrow_mut().retain(|(i, _)| *i != id);
            }
        })
    }

    /// Fills the external slot, replacing any previously attached callback.
    ///
    /// Replays the stored value on stateful cells, so a late-mounting host
    /// observes the current state.
    pub fn attach(&self, f: impl FnMut(T) + 'static) {
        let mut boxed: Box<dyn FnMut(T)> = Box::new(f);
        if self.core.replay {
            let current = self.core.value.borrow().clone();
            if let Some(value) = current {
                boxed(value);
            }
        }
        *self.core.slot.borrow_mut() = Some(boxed);
    }

    /// Clears the external slot.
    pub fn detach(&self) {
        *self.core.slot.borrow_mut() = None;
    }

    /// Returns the stored value of a replaying cell.
    pub fn get(&self) -> Option<T> {
        self.core.value.borrow().clone()
    }
}

impl<T> core::fmt::Debug for Input<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Input(..)")
    }
}

impl<T> core::fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Output(..)")
    }
}
