use crate::effect::Effects;
use crate::reducer::{BoxedReducer, Reducer};

/// Runs several reducers over the same state and action.
///
/// Constituents run in the order they were added. Each sees the mutations of
/// the ones before it, and their effects are concatenated in that same order.
pub struct Combine<State, Action> {
    reducers: Vec<BoxedReducer<State, Action>>,
}

impl<State, Action> Combine<State, Action>
where
    Action: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            reducers: Vec::new(),
        }
    }

    pub fn with<R>(mut self, reducer: R) -> Self
    where
        R: Reducer<State, Action> + Send + Sync + 'static,
    {
        self.reducers.push(Box::new(reducer));
        self
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<State, Action> Default for Combine<State, Action>
where
    Action: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<State, Action> FromIterator<BoxedReducer<State, Action>> for Combine<State, Action> {
    fn from_iter<T: IntoIterator<Item = BoxedReducer<State, Action>>>(iter: T) -> Self {
        Self {
            reducers: iter.into_iter().collect(),
        }
    }
}

impl<State, Action> Reducer<State, Action> for Combine<State, Action>
where
    Action: Clone + Send + 'static,
{
    fn reduce(&self, state: &mut State, action: Action) -> Effects<Action> {
        let mut effects = Vec::new();
        if let Some((last, rest)) = self.reducers.split_last() {
            for reducer in rest {
                effects.extend(reducer.reduce(state, action.clone()));
            }
            effects.extend(last.reduce(state, action));
        }
        effects
    }
}

pub fn combine<State, Action>(
    reducers: impl IntoIterator<Item = BoxedReducer<State, Action>>,
) -> Combine<State, Action> {
    reducers.into_iter().collect()
}

/// Builds a [`Combine`] from any number of reducers of the same type.
///
/// ```ignore
/// let app = combine![
///     counter.pullback(lens!(AppState, count), case_path!(AppAction::Counter)),
///     favorites.pullback(lens!(AppState, favorites), case_path!(AppAction::Favorites)),
/// ];
/// ```
#[macro_export]
macro_rules! combine {
    ($($reducer:expr),* $(,)?) => {
        $crate::Combine::new()$(.with($reducer))*
    };
}
