use crate::action_mapper::ActionMapper;
use crate::action_sender::AnyActionSender;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

/// Ordered list of effects produced by one reducer call.
pub type Effects<Action> = Vec<Effect<Action>>;

pub type SyncActionJob<Action> = Box<dyn FnOnce() -> Option<Action> + Send>;

pub type AsyncActionJob<Action> =
    Box<dyn FnOnce(AnyActionSender<Action>) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// Deferred unit of work returned by a reducer.
///
/// The store consumes every effect exactly once, in the order the reducer
/// returned them. Synchronous effects may yield one follow-up action, which
/// is dispatched before the next effect runs. Async effects are spawned and
/// report back through the sender they are handed, at a time of their choosing.
pub struct Effect<Action: Send + 'static> {
    pub value: EffectValue<Action>,
}

pub enum EffectValue<Action: Send + 'static> {
    None,
    Send(Action),
    Sync(SyncActionJob<Action>),
    Async(AsyncActionJob<Action>),
}

impl<Action> Effect<Action>
where
    Action: Send + 'static,
{
    /// Re-embeds every follow-up action this effect may produce.
    pub fn map<F, MappedAction>(self, map: F) -> Effect<MappedAction>
    where
        MappedAction: Send + 'static,
        F: Fn(Action) -> MappedAction + Send + Sync + 'static,
    {
        match self.value {
            EffectValue::None => Effect::none(),
            EffectValue::Send(a) => Effect::send(map(a)),
            EffectValue::Sync(job) => Effect::sync(move || job().map(map)),
            EffectValue::Async(job) => Effect::<MappedAction>::run(|sender| async move {
                let mapper = ActionMapper::new(sender, map);
                job(AnyActionSender::new(mapper)).await
            }),
        }
    }

    /// Async effect. The store spawns `job` on its tokio runtime and returns
    /// without waiting; results go back through the provided sender.
    pub fn run<T, Fut>(job: T) -> Self
    where
        Fut: Future<Output = ()> + Send + 'static,
        T: FnOnce(AnyActionSender<Action>) -> Fut + Send + 'static,
    {
        let boxed_job: AsyncActionJob<Action> = Box::new(move |sender: AnyActionSender<Action>| {
            let fut = job(sender);
            Box::pin(fut)
        });
        Self {
            value: EffectValue::Async(boxed_job),
        }
    }

    /// Synchronous effect, executed inside `send` right after observers were notified.
    pub fn sync<T>(job: T) -> Self
    where
        T: FnOnce() -> Option<Action> + Send + 'static,
    {
        Self {
            value: EffectValue::Sync(Box::new(job)),
        }
    }

    pub fn fire_and_forget<T>(work: T) -> Self
    where
        T: FnOnce() + Send + 'static,
    {
        Self::sync(move || {
            work();
            None
        })
    }

    pub fn none() -> Self {
        Self {
            value: EffectValue::None,
        }
    }

    pub fn send(action: Action) -> Self {
        Self {
            value: EffectValue::Send(action),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self.value, EffectValue::None)
    }

    /// Runs a synchronous effect right away and returns its follow-up action.
    /// Async effects cannot be resolved without a runtime and are handed back.
    pub fn resolve_now(self) -> Result<Option<Action>, Self> {
        match self.value {
            EffectValue::None => Ok(None),
            EffectValue::Send(action) => Ok(Some(action)),
            EffectValue::Sync(job) => Ok(job()),
            value @ EffectValue::Async(_) => Err(Self { value }),
        }
    }
}

impl<Action: Send + 'static> Default for Effect<Action> {
    fn default() -> Self {
        Self::none()
    }
}

impl<Action: Send + 'static> Debug for EffectValue<Action>
where
    Action: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Send(action) => write!(f, "Send {:#?}", action),
            Self::Sync(_) => f.write_str("Sync"),
            Self::Async(_) => f.write_str("Async"),
        }
    }
}

impl<Action: Send + 'static> Debug for Effect<Action>
where
    Action: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}
