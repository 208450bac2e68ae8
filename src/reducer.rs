use std::fmt::Debug;

use crate::case_path::CasePath;
use crate::combine::Combine;
use crate::effect::Effects;
use crate::lens::Lens;
use crate::logging::Logging;
use crate::pullback::Pullback;

/// Evolves `State` in place for one `Action` and returns the effects to run
/// as a consequence, in order.
///
/// Implementations must handle every action variant, must terminate and must
/// not keep the `&mut State` past the call. Reducers hold no state of their own
/// and are shared freely between stores.
pub trait Reducer<State, Action: Send + 'static> {
    fn reduce(&self, state: &mut State, action: Action) -> Effects<Action>;
}

pub type BoxedReducer<State, Action> = Box<dyn Reducer<State, Action> + Send + Sync>;

impl<State, Action, F> Reducer<State, Action> for F
where
    Action: Send + 'static,
    F: Fn(&mut State, Action) -> Effects<Action>,
{
    fn reduce(&self, state: &mut State, action: Action) -> Effects<Action> {
        self(state, action)
    }
}

/// Combinator methods available on every reducer.
pub trait ReducerExt<State, Action>: Reducer<State, Action> + Sized
where
    Action: Send + 'static,
{
    /// Lifts this reducer over a larger state and action.
    fn pullback<GlobalState, GlobalAction>(
        self,
        state: Lens<GlobalState, State>,
        action: CasePath<GlobalAction, Action>,
    ) -> Pullback<Self, GlobalState, GlobalAction, State, Action>
    where
        GlobalAction: Send + 'static,
    {
        Pullback::new(self, state, action)
    }

    /// Runs `self` then `other` on the same action.
    fn combine<R>(self, other: R) -> Combine<State, Action>
    where
        Self: Send + Sync + 'static,
        R: Reducer<State, Action> + Send + Sync + 'static,
        Action: Clone,
    {
        Combine::new().with(self).with(other)
    }

    fn logging(self) -> Logging<Self>
    where
        State: Debug,
        Action: Debug,
    {
        Logging::new(self)
    }
}

impl<State, Action, R> ReducerExt<State, Action> for R
where
    Action: Send + 'static,
    R: Reducer<State, Action>,
{
}
