use crate::case_path::CasePath;
use crate::effect::Effects;
use crate::lens::Lens;
use crate::reducer::Reducer;

/// A reducer over `LocalState`/`LocalAction` lifted over the whole application.
///
/// Actions the case path does not extract are ignored without touching the
/// state. Extracted ones run the inner reducer against the focused state,
/// which is written back through the lens, and every returned effect has its
/// follow-up actions re-embedded.
pub struct Pullback<R, GlobalState, GlobalAction, LocalState, LocalAction> {
    reducer: R,
    state: Lens<GlobalState, LocalState>,
    action: CasePath<GlobalAction, LocalAction>,
}

impl<R, GlobalState, GlobalAction, LocalState, LocalAction>
    Pullback<R, GlobalState, GlobalAction, LocalState, LocalAction>
{
    pub fn new(
        reducer: R,
        state: Lens<GlobalState, LocalState>,
        action: CasePath<GlobalAction, LocalAction>,
    ) -> Self {
        Self {
            reducer,
            state,
            action,
        }
    }
}

impl<R, GlobalState, GlobalAction, LocalState, LocalAction> Reducer<GlobalState, GlobalAction>
    for Pullback<R, GlobalState, GlobalAction, LocalState, LocalAction>
where
    R: Reducer<LocalState, LocalAction>,
    GlobalState: 'static,
    LocalState: 'static,
    GlobalAction: Send + 'static,
    LocalAction: Send + 'static,
{
    fn reduce(&self, state: &mut GlobalState, action: GlobalAction) -> Effects<GlobalAction> {
        let Some(local_action) = self.action.extract(&action) else {
            return Vec::new();
        };
        let effects = self
            .state
            .modify(state, |local| self.reducer.reduce(local, local_action));
        effects
            .into_iter()
            .map(|effect| effect.map(self.action.embedder()))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::effect::Effect;
    use crate::reducer::ReducerExt;
    use crate::{case_path, lens};

    #[derive(Clone, Debug, PartialEq, Default)]
    struct AppState {
        count: i32,
        title: String,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum CounterAction {
        Increment,
        Reset,
        DidReset,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum AppAction {
        Counter(CounterAction),
        Rename(String),
    }

    fn counter(count: &mut i32, action: CounterAction) -> Effects<CounterAction> {
        match action {
            CounterAction::Increment => {
                *count += 1;
                vec![]
            }
            CounterAction::Reset => {
                *count = 0;
                vec![Effect::send(CounterAction::DidReset)]
            }
            CounterAction::DidReset => vec![],
        }
    }

    fn app() -> impl Reducer<AppState, AppAction> {
        counter.pullback(lens!(AppState, count), case_path!(AppAction::Counter))
    }

    #[test]
    fn test_extracted_action_mutates_focused_state() {
        let mut state = AppState {
            count: 4,
            title: "t".to_string(),
        };

        let effects = app().reduce(&mut state, AppAction::Counter(CounterAction::Increment));

        assert!(effects.is_empty());
        assert_eq!(state.count, 5);
        assert_eq!(state.title, "t");
    }

    #[test]
    fn test_unrelated_action_is_ignored() {
        let mut state = AppState {
            count: 4,
            title: "t".to_string(),
        };
        let before = state.clone();

        let effects = app().reduce(&mut state, AppAction::Rename("x".to_string()));

        assert!(effects.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_local_follow_up_is_reembedded() {
        let mut state = AppState {
            count: 9,
            ..Default::default()
        };

        let effects = app().reduce(&mut state, AppAction::Counter(CounterAction::Reset));
        let follow_ups: Vec<_> = effects
            .into_iter()
            .filter_map(|effect| effect.resolve_now().ok().flatten())
            .collect();

        assert_eq!(state.count, 0);
        assert_eq!(follow_ups, vec![AppAction::Counter(CounterAction::DidReset)]);
    }
}
