use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};

use crate::action_sender::{ActionSender, AnyActionSender};
use crate::effect::{Effect, EffectValue};
use crate::error::StoreError;
use crate::observers::{Observers, Subscription};
use crate::options::StoreOptions;
use crate::reducer::Reducer;

/// Serialization point shared by a root store and every store derived from it.
pub(crate) trait Dispatching: Send + Sync {
    /// Number of `send` calls currently on the stack, 0 when idle.
    fn depth(&self) -> usize;

    /// Blocks other threads from dispatching; re-entrant on the current one.
    fn serialize(&self) -> ReentrantMutexGuard<'_, ()>;
}

/// Owns the canonical state of a root store and runs its dispatch protocol:
/// reduce, publish, then execute effects depth-first.
pub(crate) struct StoreEngine<State, Action>
where
    Action: Send + 'static,
{
    state: Mutex<State>,
    serial: ReentrantMutex<()>,
    depth: AtomicUsize,
    reducer: Box<dyn Reducer<State, Action> + Send + Sync>,
    observers: Observers<State>,
    options: StoreOptions,
}

struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<State, Action> StoreEngine<State, Action>
where
    Action: Debug + Send + 'static,
    State: Clone + Send + 'static,
{
    pub fn new(
        state: State,
        reducer: impl Reducer<State, Action> + Send + Sync + 'static,
        options: StoreOptions,
    ) -> Self {
        Self {
            state: Mutex::new(state),
            serial: ReentrantMutex::new(()),
            depth: AtomicUsize::new(0),
            reducer: Box::new(reducer),
            observers: Observers::new(),
            options,
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.state.lock())
    }

    pub fn subscribe(&self, observer: impl Fn(&State) + Send + Sync + 'static) -> Subscription {
        self.observers.subscribe(observer)
    }

    #[cfg(test)]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn dispatch(self: &Arc<Self>, action: Action) -> Result<(), StoreError> {
        let _serial = self.serial.lock();
        let depth = self.depth.fetch_add(1, Ordering::SeqCst) + 1;
        let _depth = DepthGuard(&self.depth);

        if let Some(limit) = self.options.get_max_dispatch_depth() {
            if depth > limit {
                return Err(StoreError::DispatchDepthExceeded {
                    store: self.options.get_label().to_string(),
                    limit,
                    depth,
                });
            }
        }
        log::trace!("[{}] dispatch {:?} at depth {}", self.options.get_label(), action, depth);

        let (effects, snapshot) = {
            let mut state = self.state.lock();
            let effects = self.reducer.reduce(&mut state, action);
            (effects, state.clone())
        };
        self.observers.notify(&snapshot);

        for effect in effects {
            self.perform(effect)?;
        }
        Ok(())
    }

    fn perform(self: &Arc<Self>, effect: Effect<Action>) -> Result<(), StoreError> {
        log::debug!("[{}] handling {:?}", self.options.get_label(), effect.value);
        match effect.value {
            EffectValue::None => {}
            EffectValue::Send(action) => self.dispatch(action)?,
            EffectValue::Sync(job) => {
                if let Some(action) = job() {
                    self.dispatch(action)?;
                }
            }
            EffectValue::Async(job) => {
                let runtime = self.options.runtime_handle().ok_or_else(|| {
                    StoreError::NoRuntime {
                        store: self.options.get_label().to_string(),
                    }
                })?;
                let sender = AnyActionSender::new(EngineSender {
                    engine: Arc::downgrade(self),
                });
                runtime.spawn(job(sender));
            }
        }
        Ok(())
    }
}

impl<State, Action> Dispatching for StoreEngine<State, Action>
where
    Action: Send + 'static,
    State: Send,
{
    fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    fn serialize(&self) -> ReentrantMutexGuard<'_, ()> {
        self.serial.lock()
    }
}

/// Sender handed to async effects. It does not keep the store alive; actions
/// arriving after the store was dropped are discarded.
struct EngineSender<State, Action>
where
    Action: Send + 'static,
{
    engine: Weak<StoreEngine<State, Action>>,
}

impl<State, Action> ActionSender for EngineSender<State, Action>
where
    Action: Debug + Send + 'static,
    State: Clone + Send + 'static,
{
    type SendableAction = Action;

    fn try_send(&self, action: Action) -> Result<(), StoreError> {
        match self.engine.upgrade() {
            Some(engine) => engine.dispatch(action),
            None => {
                log::warn!("dropping {:?}: its store no longer exists", action);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::effect::Effects;

    #[derive(Default, Clone, PartialEq, Debug)]
    struct State {
        trail: Vec<&'static str>,
    }

    #[derive(Debug)]
    enum Action {
        Start,
        Left,
        LeftChild,
        Right,
        Loop,
    }

    fn reducer(state: &mut State, action: Action) -> Effects<Action> {
        match action {
            Action::Start => {
                state.trail.push("start");
                vec![Effect::send(Action::Left), Effect::send(Action::Right)]
            }
            Action::Left => {
                state.trail.push("left");
                vec![Effect::sync(|| Some(Action::LeftChild))]
            }
            Action::LeftChild => {
                state.trail.push("left-child");
                vec![]
            }
            Action::Right => {
                state.trail.push("right");
                vec![]
            }
            Action::Loop => vec![Effect::send(Action::Loop)],
        }
    }

    #[test]
    fn test_effects_recurse_depth_first() {
        let engine = Arc::new(StoreEngine::new(
            State::default(),
            reducer,
            StoreOptions::default(),
        ));

        engine.dispatch(Action::Start).unwrap();

        assert_eq!(
            engine.with_state(|s| s.trail.clone()),
            vec!["start", "left", "left-child", "right"]
        );
        assert_eq!(engine.depth(), 0);
    }

    #[test]
    fn test_depth_limit_stops_runaway_effects() {
        let engine = Arc::new(StoreEngine::new(
            State::default(),
            reducer,
            StoreOptions::new().label("looping").max_dispatch_depth(16),
        ));

        let error = engine.dispatch(Action::Loop).unwrap_err();

        assert_eq!(
            error,
            StoreError::DispatchDepthExceeded {
                store: "looping".to_string(),
                limit: 16,
                depth: 17,
            }
        );
        assert_eq!(engine.depth(), 0);
    }

    #[test]
    fn test_async_effect_without_runtime_is_an_error() {
        let async_reducer = |_: &mut State, _: Action| -> Effects<Action> {
            vec![Effect::run(|_sender| async {})]
        };
        let engine = Arc::new(StoreEngine::new(
            State::default(),
            async_reducer,
            StoreOptions::default(),
        ));

        assert!(matches!(
            engine.dispatch(Action::Start),
            Err(StoreError::NoRuntime { .. })
        ));
    }

    #[test]
    fn test_failing_effect_stops_remaining_effects() {
        let mixed_reducer = |state: &mut State, action: Action| -> Effects<Action> {
            match action {
                Action::Start => vec![
                    Effect::send(Action::Left),
                    Effect::run(|_sender| async {}),
                    Effect::send(Action::Right),
                ],
                Action::Left => {
                    state.trail.push("left");
                    vec![]
                }
                Action::Right => {
                    state.trail.push("right");
                    vec![]
                }
                _ => vec![],
            }
        };
        let engine = Arc::new(StoreEngine::new(
            State::default(),
            mixed_reducer,
            StoreOptions::default(),
        ));

        assert!(engine.dispatch(Action::Start).is_err());
        assert_eq!(engine.with_state(|s| s.trail.clone()), vec!["left"]);
        assert_eq!(engine.depth(), 0);
    }

    #[test]
    fn test_sender_for_dropped_engine_discards() {
        let engine = Arc::new(StoreEngine::new(
            State::default(),
            reducer,
            StoreOptions::default(),
        ));
        let sender = EngineSender {
            engine: Arc::downgrade(&engine),
        };
        drop(engine);

        assert!(sender.try_send(Action::Start).is_ok());
    }
}
