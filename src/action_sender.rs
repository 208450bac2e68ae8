use std::ops::Deref;
use std::sync::Arc;

use crate::error::StoreError;

/// Something actions can be injected into: a store, a derived store, or a
/// mapper in front of either.
pub trait ActionSender: Send + Sync {
    type SendableAction;

    /// Dispatches `action` and runs its effects.
    ///
    /// On error the dispatch stops where it failed: state changes already
    /// applied and published stay, and the effects after the failing one
    /// never run.
    fn try_send(&self, action: Self::SendableAction) -> Result<(), StoreError>;

    /// Infallible send. A dispatch failure is a programming error and aborts
    /// the dispatch with a panic.
    fn send(&self, action: Self::SendableAction) {
        if let Err(error) = self.try_send(action) {
            log::error!("{}", error);
            panic!("{}", error);
        }
    }
}

/// Type-erased [`ActionSender`]. Async effects receive one of these to report
/// their results back into the store that launched them.
pub struct AnyActionSender<Action: Send + 'static> {
    value: Arc<dyn ActionSender<SendableAction = Action>>,
}

impl<Action: Send + 'static> AnyActionSender<Action> {
    pub fn new(value: impl ActionSender<SendableAction = Action> + 'static) -> Self {
        Self {
            value: Arc::new(value),
        }
    }
}

impl<Action: Send + 'static> Clone for AnyActionSender<Action> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
        }
    }
}

impl<Action: Send + 'static> ActionSender for AnyActionSender<Action> {
    type SendableAction = Action;

    fn try_send(&self, action: Action) -> Result<(), StoreError> {
        self.value.try_send(action)
    }
}

impl<T> ActionSender for Arc<T>
where
    T: ActionSender + ?Sized,
{
    type SendableAction = T::SendableAction;

    fn try_send(&self, action: Self::SendableAction) -> Result<(), StoreError> {
        self.deref().try_send(action)
    }
}
