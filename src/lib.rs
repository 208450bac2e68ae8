//! Unidirectional state management in the style of the Composable Architecture.
//!
//! An application is a single state tree evolved only by actions. Features
//! each own a slice of that state and a sub-enum of the actions, written as
//! plain [`Reducer`]s, then lifted into the whole with [`ReducerExt::pullback`]
//! (a [`Lens`] for the state, a [`CasePath`] for the actions) and merged with
//! [`combine!`]. A [`Store`] owns the state and runs the composed reducer;
//! [`Store::view`] hands narrower stores to the code that only needs a slice.
//!
//! ```ignore
//! let app = combine![
//!     counter.pullback(lens!(AppState, count), case_path!(AppAction::Counter)),
//!     favorites.pullback(lens!(AppState, favorites), case_path!(AppAction::Favorites)),
//! ]
//! .logging();
//! let store = Store::new(AppState::default(), app);
//! store.send(AppAction::Counter(CounterAction::Increment));
//! ```

mod action_mapper;
mod action_sender;
mod case_path;
mod change_observer;
mod combine;
mod effect;
mod engine;
mod error;
mod lens;
mod logging;
mod observers;
mod options;
mod pullback;
mod reducer;
mod store;

pub use action_mapper::ActionMapper;
pub use action_sender::{ActionSender, AnyActionSender};
pub use case_path::CasePath;
pub use change_observer::{ChangeObserver, StateStream};
pub use combine::{combine, Combine};
pub use effect::{Effect, EffectValue, Effects};
pub use error::StoreError;
pub use lens::Lens;
pub use logging::{Logging, LOG_TARGET};
pub use observers::Subscription;
pub use options::StoreOptions;
pub use pullback::Pullback;
pub use reducer::{BoxedReducer, Reducer, ReducerExt};
pub use store::Store;
