use std::fmt::Debug;

use crate::effect::{Effect, Effects};
use crate::reducer::Reducer;

pub const LOG_TARGET: &str = "tca::logging";

/// Records every action together with the state it produced.
///
/// The inner reducer runs first; the record is written by an extra effect
/// placed ahead of the inner reducer's effects, which never yields an action.
pub struct Logging<R> {
    reducer: R,
    level: log::Level,
}

impl<R> Logging<R> {
    pub fn new(reducer: R) -> Self {
        Self {
            reducer,
            level: log::Level::Info,
        }
    }

    pub fn with_level(mut self, level: log::Level) -> Self {
        self.level = level;
        self
    }
}

impl<R, State, Action> Reducer<State, Action> for Logging<R>
where
    R: Reducer<State, Action>,
    State: Debug,
    Action: Debug + Send + 'static,
{
    fn reduce(&self, state: &mut State, action: Action) -> Effects<Action> {
        let level = self.level;
        let enabled = log::log_enabled!(target: LOG_TARGET, level);
        let action_description = enabled.then(|| format!("{:?}", action));

        let effects = self.reducer.reduce(state, action);
        let state_description = enabled.then(|| format!("{:#?}", state));

        let record = Effect::fire_and_forget(move || {
            if let (Some(action), Some(state)) = (action_description, state_description) {
                log::log!(target: LOG_TARGET, level, "Action: {}", action);
                log::log!(target: LOG_TARGET, level, "State:\n{}\n---", state);
            }
        });

        let mut all = Vec::with_capacity(effects.len() + 1);
        all.push(record);
        all.extend(effects);
        all
    }
}
