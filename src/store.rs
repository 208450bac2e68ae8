use std::fmt::Debug;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::action_mapper::ActionMapper;
use crate::action_sender::{ActionSender, AnyActionSender};
use crate::change_observer::{ChangeObserver, StateStream};
use crate::engine::{Dispatching, StoreEngine};
use crate::error::StoreError;
use crate::observers::{Observers, Subscription};
use crate::options::StoreOptions;
use crate::reducer::Reducer;

/// Runtime owner of a state tree.
///
/// `send` runs the reducer, publishes the new state to every observer, then
/// executes the returned effects in order, dispatching their follow-up actions
/// depth-first before moving on to the next effect.
///
/// `Store` is a cheap handle: clones share the same state. Stores obtained
/// through [`Store::view`] project a parent store instead of owning state.
pub struct Store<State, Action>
where
    Action: Debug + Send + 'static,
    State: Clone + Send + 'static,
{
    engine: EngineHolder<State, Action>,
}

enum EngineHolder<State, Action>
where
    Action: Debug + Send + 'static,
    State: Clone + Send + 'static,
{
    Engine(Arc<StoreEngine<State, Action>>),
    Parent(Arc<ScopedEngine<State, Action>>),
}

/// State of a derived store: a projection of its parent kept current by a
/// subscription that lives as long as the derived store does.
struct ScopedEngine<State, Action>
where
    Action: Send + 'static,
{
    state: Mutex<State>,
    observers: Observers<State>,
    parent: AnyActionSender<Action>,
    root: Arc<dyn Dispatching>,
    options: StoreOptions,
    _upstream: Subscription,
}

impl<State, Action> ScopedEngine<State, Action>
where
    Action: Send + 'static,
    State: Clone + Send + 'static,
{
    fn replace(&self, state: State) {
        let snapshot = {
            let mut current = self.state.lock();
            *current = state;
            current.clone()
        };
        self.observers.notify(&snapshot);
    }
}

impl<State, Action> Store<State, Action>
where
    Action: Debug + Send + 'static,
    State: Clone + Send + 'static,
{
    pub fn new<R: Reducer<State, Action> + Sync + Send + 'static>(
        state: State,
        reducer: R,
    ) -> Self {
        Self::with_options(state, reducer, StoreOptions::default())
    }

    pub fn with_options<R: Reducer<State, Action> + Sync + Send + 'static>(
        state: State,
        reducer: R,
        options: StoreOptions,
    ) -> Self {
        let engine = StoreEngine::new(state, reducer, options);
        Self {
            engine: EngineHolder::Engine(Arc::new(engine)),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> State {
        self.with_state(State::clone)
    }

    /// Reads the current state in place. `f` must not send actions.
    pub fn with_state<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        match &self.engine {
            EngineHolder::Engine(engine) => engine.with_state(f),
            EngineHolder::Parent(scoped) => f(&scoped.state.lock()),
        }
    }

    /// Registers `observer` to receive every state this store publishes.
    pub fn subscribe(&self, observer: impl Fn(&State) + Send + Sync + 'static) -> Subscription {
        match &self.engine {
            EngineHolder::Engine(engine) => engine.subscribe(observer),
            EngineHolder::Parent(scoped) => scoped.observers.subscribe(observer),
        }
    }

    pub fn options(&self) -> &StoreOptions {
        match &self.engine {
            EngineHolder::Engine(engine) => engine.options(),
            EngineHolder::Parent(scoped) => &scoped.options,
        }
    }

    /// Nesting level of the dispatch in progress on the root store, 0 when idle.
    pub fn dispatch_depth(&self) -> usize {
        self.root().depth()
    }

    pub fn is_dispatching(&self) -> bool {
        self.dispatch_depth() > 0
    }

    /// Derives a store whose state is `to_local` of this store's state and
    /// whose actions are embedded with `to_global` and sent here.
    ///
    /// The derived store follows every change of this store, whoever caused
    /// it. This store only keeps a weak reference to it; dropping the derived
    /// store releases its subscription.
    pub fn view<LocalState, LocalAction>(
        &self,
        to_local: impl Fn(&State) -> LocalState + Send + Sync + 'static,
        to_global: impl Fn(LocalAction) -> Action + Send + Sync + 'static,
    ) -> Store<LocalState, LocalAction>
    where
        LocalState: Clone + Send + 'static,
        LocalAction: Debug + Send + 'static,
    {
        let root = self.root();
        // No dispatch may slip between reading the initial state and subscribing.
        let _serial = root.serialize();

        let to_local = Arc::new(to_local);
        let parent = AnyActionSender::new(ActionMapper::new(
            AnyActionSender::new(self.clone()),
            to_global,
        ));
        let options = self.options().child("view");

        let scoped = Arc::new_cyclic(|child: &Weak<ScopedEngine<LocalState, LocalAction>>| {
            let upstream = self.subscribe({
                let child = child.clone();
                let to_local = to_local.clone();
                move |state| {
                    if let Some(child) = child.upgrade() {
                        child.replace((*to_local)(state));
                    }
                }
            });
            ScopedEngine {
                state: Mutex::new(self.with_state(|state| (*to_local)(state))),
                observers: Observers::new(),
                parent,
                root: root.clone(),
                options,
                _upstream: upstream,
            }
        });
        log::trace!("[{}] derived store created", scoped.options.get_label());

        Store {
            engine: EngineHolder::Parent(scoped),
        }
    }

    fn root(&self) -> Arc<dyn Dispatching> {
        match &self.engine {
            EngineHolder::Engine(engine) => engine.clone() as Arc<dyn Dispatching>,
            EngineHolder::Parent(scoped) => scoped.root.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn observer_count(&self) -> usize {
        match &self.engine {
            EngineHolder::Engine(engine) => engine.observer_count(),
            EngineHolder::Parent(scoped) => scoped.observers.len(),
        }
    }
}

impl<State, Action> Clone for Store<State, Action>
where
    Action: Debug + Send + 'static,
    State: Clone + Send + 'static,
{
    fn clone(&self) -> Self {
        let engine = match &self.engine {
            EngineHolder::Engine(engine) => EngineHolder::Engine(engine.clone()),
            EngineHolder::Parent(scoped) => EngineHolder::Parent(scoped.clone()),
        };
        Self { engine }
    }
}

impl<State, Action> ActionSender for Store<State, Action>
where
    Action: Debug + Send + 'static,
    State: Clone + Send + 'static,
{
    type SendableAction = Action;

    fn try_send(&self, action: Action) -> Result<(), StoreError> {
        match &self.engine {
            EngineHolder::Engine(engine) => engine.dispatch(action),
            EngineHolder::Parent(scoped) => scoped.parent.try_send(action),
        }
    }
}

impl<State, Action> ChangeObserver for Store<State, Action>
where
    Action: Debug + Send + 'static,
    State: Clone + Send + 'static,
{
    type State = State;

    fn observe(&self) -> StateStream<State> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let subscription = self.subscribe(move |state| {
            let _ = sender.send(state.clone());
        });
        StateStream::new(receiver, subscription)
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::effect::{Effect, Effects};

    use super::*;

    #[derive(Default, Clone, PartialEq, Debug)]
    struct State {
        counter: i32,
        label: String,
    }

    #[derive(Debug, Clone)]
    enum Action {
        Increment,
        Rename(String),
        IncrementLater,
        IncrementTwice,
    }

    #[derive(Default)]
    struct Feature {}

    impl Reducer<State, Action> for Feature {
        fn reduce(&self, state: &mut State, action: Action) -> Effects<Action> {
            match action {
                Action::Increment => {
                    state.counter += 1;
                    vec![]
                }
                Action::Rename(label) => {
                    state.label = label;
                    vec![]
                }
                Action::IncrementLater => vec![Effect::run(|sender| async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    sender.send(Action::Increment);
                })],
                Action::IncrementTwice => vec![
                    Effect::send(Action::Increment),
                    Effect::sync(|| Some(Action::Increment)),
                ],
            }
        }
    }

    fn recorder<T: Clone + Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(&T) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = seen.clone();
            move |value: &T| seen.lock().push(value.clone())
        };
        (seen, sink)
    }

    #[test]
    fn test_simple_action() {
        let store = Store::new(State::default(), Feature::default());
        store.send(Action::Increment);
        assert_eq!(store.state().counter, 1);
    }

    #[test]
    fn test_every_dispatch_is_published() {
        let store = Store::new(State::default(), Feature::default());
        let (seen, sink) = recorder::<State>();
        let _subscription = store.subscribe(sink);

        store.send(Action::Rename("a".to_string()));
        store.send(Action::Rename("a".to_string()));
        store.send(Action::IncrementTwice);

        let counters: Vec<_> = seen.lock().iter().map(|s| s.counter).collect();
        assert_eq!(counters, vec![0, 0, 0, 1, 2]);
        assert_eq!(store.state().counter, 2);
    }

    #[test]
    fn test_observer_may_send_reentrantly() {
        let store = Store::new(State::default(), Feature::default());
        let _subscription = store.subscribe({
            let store = store.clone();
            move |state: &State| {
                if state.label == "go" && state.counter == 0 {
                    store.send(Action::Increment);
                }
            }
        });

        store.send(Action::Rename("go".to_string()));

        assert_eq!(store.state().counter, 1);
        assert!(!store.is_dispatching());
    }

    fn resend_once_at_one(store: &Store<State, Action>) -> Subscription {
        let sender = store.clone();
        store.subscribe(move |state: &State| {
            if state.counter == 1 {
                sender.send(Action::Increment);
            }
        })
    }

    #[test]
    fn test_view_after_resending_observer_ends_current() {
        let store = Store::new(State::default(), Feature::default());
        let _resend = resend_once_at_one(&store);
        let counter = store.view(|state: &State| state.counter, |action: Action| action);
        let (seen, sink) = recorder::<i32>();
        let _subscription = counter.subscribe(sink);

        store.send(Action::Increment);

        assert_eq!(store.state().counter, 2);
        assert_eq!(counter.state(), store.state().counter);
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn test_changes_stream_in_order_despite_resending_observer() {
        let store = Store::new(State::default(), Feature::default());
        let _resend = resend_once_at_one(&store);
        let mut changes = store.observe();

        store.send(Action::Increment);

        let mut counters = Vec::new();
        while let Some(state) = changes.try_next_state() {
            counters.push(state.counter);
        }
        assert_eq!(counters, vec![1, 2]);
    }

    #[test]
    fn test_view_projects_parent_state() {
        let store = Store::new(State::default(), Feature::default());
        let counter = store.view(|state: &State| state.counter, |action: Action| action);

        store.send(Action::Increment);

        assert_eq!(counter.state(), 1);
    }

    #[test]
    fn test_view_sends_through_parent() {
        #[derive(Debug)]
        enum CounterAction {
            Tapped,
        }

        let store = Store::new(State::default(), Feature::default());
        let counter = store.view(
            |state: &State| state.counter,
            |action: CounterAction| match action {
                CounterAction::Tapped => Action::Increment,
            },
        );
        let (seen, sink) = recorder::<i32>();
        let _subscription = counter.subscribe(sink);

        counter.send(CounterAction::Tapped);
        counter.send(CounterAction::Tapped);

        assert_eq!(store.state().counter, 2);
        assert_eq!(counter.state(), 2);
        assert_eq!(*seen.lock(), vec![1, 2]);
    }

    #[test]
    fn test_sibling_views_stay_consistent() {
        let store = Store::new(State::default(), Feature::default());
        let counter = store.view(|state: &State| state.counter, |action: Action| action);
        let label = store.view(|state: &State| state.label.clone(), |action: Action| action);
        let nested = counter.view(|counter: &i32| counter * 10, |action: Action| action);

        label.send(Action::Rename("x".to_string()));
        counter.send(Action::Increment);

        assert_eq!(label.state(), "x");
        assert_eq!(counter.state(), 1);
        assert_eq!(nested.state(), 10);
    }

    #[test]
    fn test_dropping_view_releases_subscription() {
        let store = Store::new(State::default(), Feature::default());
        let counter = store.view(|state: &State| state.counter, |action: Action| action);
        assert_eq!(store.observer_count(), 1);

        drop(counter);
        store.send(Action::Increment);

        assert_eq!(store.observer_count(), 0);
    }

    #[test]
    fn test_concurrent_senders_are_serialized() {
        let store = Store::new(State::default(), Feature::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        store.send(Action::Increment);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.state().counter, 1000);
    }

    #[tokio::test]
    async fn test_async_effect_sends_back_later() {
        let store = Store::new(State::default(), Feature::default());
        let mut changes = store.observe();

        store.send(Action::IncrementLater);
        assert_eq!(store.state().counter, 0);

        let mut latest = changes.next_state().await.unwrap();
        while latest.counter == 0 {
            latest = changes.next_state().await.unwrap();
        }
        assert_eq!(latest.counter, 1);
        assert_eq!(store.state().counter, 1);
    }

    #[tokio::test]
    async fn test_async_effect_outliving_store_is_dropped() {
        let store = Store::new(State::default(), Feature::default());
        let mut changes = store.observe();

        store.send(Action::IncrementLater);
        drop(store);

        assert!(changes.next_state().await.is_some());
        assert!(changes.next_state().await.is_none());
    }
}
