use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Observer<State> = Arc<dyn Fn(&State) + Send + Sync>;

struct ObserverList<State> {
    next_id: u64,
    entries: Vec<(u64, Observer<State>)>,
}

trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: u64);
}

impl<State: 'static> Unsubscribe for Mutex<ObserverList<State>> {
    fn unsubscribe(&self, id: u64) {
        self.lock().entries.retain(|(entry, _)| *entry != id);
    }
}

/// States published while a notification round is still running.
struct Delivery<State> {
    active: bool,
    pending: VecDeque<State>,
}

/// Fan-out list of state observers.
///
/// Every observer gets the complete new state on every change, synchronously
/// and in registration order. Observers may subscribe, unsubscribe or send
/// actions while being notified. A state published from inside an observer is
/// queued and delivered once every observer has seen the current one, so all
/// observers see changes in the order they happened.
pub(crate) struct Observers<State> {
    list: Arc<Mutex<ObserverList<State>>>,
    delivery: Mutex<Delivery<State>>,
}

/// Ends a notification round, also when an observer panics.
struct RoundGuard<'a, State>(&'a Mutex<Delivery<State>>);

impl<State> Drop for RoundGuard<'_, State> {
    fn drop(&mut self) {
        let mut delivery = self.0.lock();
        delivery.active = false;
        delivery.pending.clear();
    }
}

impl<State: 'static> Observers<State> {
    pub fn new() -> Self {
        Self {
            list: Arc::new(Mutex::new(ObserverList {
                next_id: 0,
                entries: Vec::new(),
            })),
            delivery: Mutex::new(Delivery {
                active: false,
                pending: VecDeque::new(),
            }),
        }
    }

    pub fn subscribe(&self, observer: impl Fn(&State) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut list = self.list.lock();
            let id = list.next_id;
            list.next_id += 1;
            list.entries.push((id, Arc::new(observer)));
            id
        };
        let registry: Weak<dyn Unsubscribe> = Arc::downgrade(&self.list) as Weak<dyn Unsubscribe>;
        Subscription { registry, id }
    }

    pub fn notify(&self, state: &State)
    where
        State: Clone,
    {
        {
            let mut delivery = self.delivery.lock();
            if delivery.active {
                delivery.pending.push_back(state.clone());
                return;
            }
            delivery.active = true;
        }
        let _round = RoundGuard(&self.delivery);

        self.deliver(state);
        loop {
            let next = self.delivery.lock().pending.pop_front();
            match next {
                Some(state) => self.deliver(&state),
                None => break,
            }
        }
    }

    fn deliver(&self, state: &State) {
        let observers: Vec<Observer<State>> = self
            .list
            .lock()
            .entries
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer(state);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.list.lock().entries.len()
    }
}

/// Keeps an observer registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    registry: Weak<dyn Unsubscribe>,
    id: u64,
}

impl Subscription {
    /// Whether the store this subscription belongs to is still alive.
    pub fn is_active(&self) -> bool {
        self.registry.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
