//! Change notification for entity snapshots and mutation failures.
//!
//! # Responsibility
//! - Fan out the latest snapshot of a store to subscribed listeners.
//! - Fan out failed-mutation events on a separate error channel.
//!
//! # Invariants
//! - A new subscriber receives the current snapshot before anything else,
//!   and never the same snapshot twice in a row.
//! - A panicking listener does not wedge later deliveries.
//! - Publishing the same snapshot handle twice in a row emits once.
//! - Listeners may subscribe, unsubscribe or mutate from inside a callback;
//!   nested emissions are queued and delivered after the current round.
//! - Queued snapshot broadcasts coalesce: only the latest one is delivered.

use crate::model::EntityKind;
use crate::store::entity_store::{Snapshot, StoreError};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, VecDeque};
use std::fmt::{Display, Formatter};
use std::rc::{Rc, Weak};

type Callback<V> = Box<dyn FnMut(&V)>;

trait Cancel {
    fn cancel(&self, id: u64);
    fn is_registered(&self, id: u64) -> bool;
}

struct Delivery<V> {
    /// `None` broadcasts; `Some(id)` replays to one listener.
    target: Option<u64>,
    value: V,
}

struct ListenerSet<V> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Callback<V>)>>,
    active: RefCell<BTreeSet<u64>>,
    queue: RefCell<VecDeque<Delivery<V>>>,
    emitting: Cell<bool>,
    coalesce: bool,
}

impl<V> ListenerSet<V> {
    fn new(coalesce: bool) -> Self {
        Self {
            next_id: Cell::new(1),
            listeners: RefCell::new(Vec::new()),
            active: RefCell::new(BTreeSet::new()),
            queue: RefCell::new(VecDeque::new()),
            emitting: Cell::new(false),
            coalesce,
        }
    }

    fn register(&self, callback: Callback<V>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.active.borrow_mut().insert(id);
        self.listeners.borrow_mut().push((id, callback));
        id
    }

    fn len(&self) -> usize {
        self.active.borrow().len()
    }

    fn enqueue(&self, delivery: Delivery<V>) {
        {
            let mut queue = self.queue.borrow_mut();
            if self.coalesce && delivery.target.is_none() {
                queue.retain(|pending| pending.target.is_some());
            }
            queue.push_back(delivery);
        }
        self.drain();
    }

    fn has_pending_broadcast(&self) -> bool {
        self.queue
            .borrow()
            .iter()
            .any(|pending| pending.target.is_none())
    }

    fn drain(&self) {
        if self.emitting.replace(true) {
            return;
        }
        let _emitting = EmittingFlag(&self.emitting);
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(delivery) = next else {
                break;
            };

            // Listeners run without any borrow held, so callbacks can
            // re-enter `register`/`cancel`/`enqueue`.
            let mut round = Round {
                set: self,
                listeners: std::mem::take(&mut *self.listeners.borrow_mut()),
            };
            for (id, callback) in round.listeners.iter_mut() {
                if delivery.target.is_some_and(|target| target != *id) {
                    continue;
                }
                if !self.active.borrow().contains(id) {
                    continue;
                }
                callback(&delivery.value);
            }
        }
    }
}

/// Clears the emitting flag even when a listener panics.
struct EmittingFlag<'a>(&'a Cell<bool>);

impl Drop for EmittingFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Listeners taken out for one delivery; merged back on drop together with
/// any registered during the round.
struct Round<'a, V> {
    set: &'a ListenerSet<V>,
    listeners: Vec<(u64, Callback<V>)>,
}

impl<V> Drop for Round<'_, V> {
    fn drop(&mut self) {
        let mut slot = self.set.listeners.borrow_mut();
        let added = std::mem::replace(&mut *slot, std::mem::take(&mut self.listeners));
        slot.extend(added);
        let active = self.set.active.borrow();
        slot.retain(|(id, _)| active.contains(id));
    }
}

impl<V> Cancel for ListenerSet<V> {
    fn cancel(&self, id: u64) {
        self.active.borrow_mut().remove(&id);
        if !self.emitting.get() {
            self.listeners
                .borrow_mut()
                .retain(|(listener_id, _)| *listener_id != id);
        }
    }

    fn is_registered(&self, id: u64) -> bool {
        self.active.borrow().contains(&id)
    }
}

/// Handle to one registered listener.
///
/// Dropping the handle keeps the listener registered; call `unsubscribe`.
pub struct Subscription {
    id: u64,
    set: Weak<dyn Cancel>,
}

impl Subscription {
    /// Stops further deliveries, including ones already queued.
    pub fn unsubscribe(self) {
        if let Some(set) = self.set.upgrade() {
            set.cancel(self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.set
            .upgrade()
            .is_some_and(|set| set.is_registered(self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Latest-snapshot publisher for one store.
pub struct SnapshotNotifier<T: 'static> {
    current: RefCell<Snapshot<T>>,
    listeners: Rc<ListenerSet<Snapshot<T>>>,
}

impl<T: 'static> SnapshotNotifier<T> {
    pub fn new(initial: Snapshot<T>) -> Self {
        Self {
            current: RefCell::new(initial),
            listeners: Rc::new(ListenerSet::new(true)),
        }
    }

    /// Registers `callback` and replays the current snapshot to it.
    pub fn subscribe(&self, callback: impl FnMut(&Snapshot<T>) + 'static) -> Subscription {
        let id = self.listeners.register(Box::new(callback));
        // A queued broadcast always carries `current` and will reach the new
        // listener too; replaying it as well would deliver it twice.
        if !self.listeners.has_pending_broadcast() {
            let replay = Rc::clone(&self.current.borrow());
            self.listeners.enqueue(Delivery {
                target: Some(id),
                value: replay,
            });
        }
        let weak = Rc::downgrade(&self.listeners);
        let set: Weak<dyn Cancel> = weak;
        Subscription { id, set }
    }

    /// Emits `snapshot` unless it is the handle emitted last.
    ///
    /// Returns whether an emission was scheduled.
    pub fn publish(&self, snapshot: Snapshot<T>) -> bool {
        {
            let mut current = self.current.borrow_mut();
            if Rc::ptr_eq(&current, &snapshot) {
                return false;
            }
            *current = Rc::clone(&snapshot);
        }
        self.listeners.enqueue(Delivery {
            target: None,
            value: snapshot,
        });
        true
    }

    pub fn current(&self) -> Snapshot<T> {
        Rc::clone(&self.current.borrow())
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Mutation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
    SetInitialData,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::SetInitialData => "set_initial_data",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed mutation, delivered on the error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub kind: EntityKind,
    pub operation: Operation,
    /// User-facing summary, e.g. `failed to update task`.
    pub message: String,
    pub cause: StoreError,
}

impl ErrorEvent {
    pub fn new(kind: EntityKind, operation: Operation, cause: StoreError) -> Self {
        Self {
            kind,
            operation,
            message: format!("failed to {} {}", operation.as_str().replace('_', " "), kind),
            cause,
        }
    }
}

impl Display for ErrorEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.message, self.cause)
    }
}

/// Error-event channel; no replay, no coalescing.
pub struct ErrorChannel {
    listeners: Rc<ListenerSet<ErrorEvent>>,
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self {
            listeners: Rc::new(ListenerSet::new(false)),
        }
    }
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: impl FnMut(&ErrorEvent) + 'static) -> Subscription {
        let id = self.listeners.register(Box::new(callback));
        let weak = Rc::downgrade(&self.listeners);
        let set: Weak<dyn Cancel> = weak;
        Subscription { id, set }
    }

    pub fn emit(&self, event: ErrorEvent) {
        self.listeners.enqueue(Delivery {
            target: None,
            value: event,
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorChannel, ErrorEvent, Operation, SnapshotNotifier};
    use crate::model::EntityKind;
    use crate::store::entity_store::StoreError;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn subscribe_replays_current_snapshot() {
        let notifier = SnapshotNotifier::new(Rc::new(vec![1, 2]));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = notifier.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.len()));
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn same_handle_is_published_once() {
        let notifier = SnapshotNotifier::new(Rc::new(Vec::<u8>::new()));
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let _sub = notifier.subscribe(move |_| *sink.borrow_mut() += 1);

        let next = Rc::new(vec![7]);
        assert!(notifier.publish(Rc::clone(&next)));
        assert!(!notifier.publish(next));
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let notifier = SnapshotNotifier::new(Rc::new(Vec::<u8>::new()));
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let sub = notifier.subscribe(move |_| *sink.borrow_mut() += 1);
        assert!(sub.is_active());
        sub.unsubscribe();
        notifier.publish(Rc::new(vec![1]));
        assert_eq!(*count.borrow(), 1);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn nested_publish_is_delivered_after_the_current_round() {
        let notifier = Rc::new(SnapshotNotifier::new(Rc::new(vec![0u8])));
        let order = Rc::new(RefCell::new(Vec::new()));

        let inner = Rc::clone(&notifier);
        let first = Rc::clone(&order);
        let _a = notifier.subscribe(move |snapshot| {
            first.borrow_mut().push(("a", snapshot[0]));
            if snapshot[0] == 1 {
                inner.publish(Rc::new(vec![2]));
            }
        });
        let second = Rc::clone(&order);
        let _b = notifier.subscribe(move |snapshot| second.borrow_mut().push(("b", snapshot[0])));

        order.borrow_mut().clear();
        notifier.publish(Rc::new(vec![1]));
        assert_eq!(
            *order.borrow(),
            vec![("a", 1), ("b", 1), ("a", 2), ("b", 2)]
        );
    }

    #[test]
    fn error_channel_has_no_replay() {
        let channel = ErrorChannel::new();
        channel.emit(ErrorEvent::new(
            EntityKind::Task,
            Operation::Delete,
            StoreError::not_found(EntityKind::Task, "task-1"),
        ));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = channel.subscribe(move |event: &ErrorEvent| sink.borrow_mut().push(event.clone()));
        assert!(seen.borrow().is_empty());

        channel.emit(ErrorEvent::new(
            EntityKind::Task,
            Operation::Update,
            StoreError::not_found(EntityKind::Task, "task-2"),
        ));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].message, "failed to update task");
    }

    #[test]
    fn subscriber_joining_before_a_queued_broadcast_sees_it_once() {
        let notifier = Rc::new(SnapshotNotifier::new(Rc::new(vec![0u8])));
        let late = Rc::new(RefCell::new(Vec::new()));

        let inner = Rc::clone(&notifier);
        let sink = Rc::clone(&late);
        let _a = notifier.subscribe(move |snapshot| {
            if snapshot[0] == 1 {
                inner.publish(Rc::new(vec![2]));
                let sink = Rc::clone(&sink);
                let _late = inner.subscribe(move |snapshot| sink.borrow_mut().push(snapshot[0]));
            }
        });

        notifier.publish(Rc::new(vec![1]));
        assert_eq!(*late.borrow(), vec![2]);
    }

    #[test]
    fn delivery_resumes_after_a_listener_panics() {
        let notifier = SnapshotNotifier::new(Rc::new(vec![0u8]));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _healthy = notifier.subscribe(move |snapshot| sink.borrow_mut().push(snapshot[0]));
        let _faulty = notifier.subscribe(|snapshot| assert_ne!(snapshot[0], 1));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            notifier.publish(Rc::new(vec![1]));
        }));
        assert!(result.is_err());

        notifier.publish(Rc::new(vec![2]));
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
        assert_eq!(notifier.subscriber_count(), 2);
    }
}
