//! Features of the prime-time app: a counter that can ask for the nth prime,
//! a modal that saves primes as favorites, a list of favorites, and an
//! activity feed that follows all of them.

use std::time::SystemTime;

use tca::{case_path, combine, lens, CasePath, Effects, Lens, Reducer, ReducerExt};

pub mod counter {
    use tca::{ActionSender, Effect, Effects};

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct CounterState {
        pub count: i32,
        pub alert_nth_prime: Option<i32>,
        pub is_nth_prime_request_in_flight: bool,
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum CounterAction {
        DecrTapped,
        IncrTapped,
        NthPrimeButtonTapped,
        NthPrimeResponse(Option<i32>),
        AlertDismissed,
    }

    pub fn reducer(state: &mut CounterState, action: CounterAction) -> Effects<CounterAction> {
        match action {
            CounterAction::DecrTapped => {
                state.count -= 1;
                vec![]
            }
            CounterAction::IncrTapped => {
                state.count += 1;
                vec![]
            }
            CounterAction::NthPrimeButtonTapped => {
                state.is_nth_prime_request_in_flight = true;
                let n = state.count;
                vec![Effect::run(move |sender| async move {
                    let prime = tokio::task::spawn_blocking(move || super::nth_prime(n))
                        .await
                        .ok()
                        .flatten();
                    sender.send(CounterAction::NthPrimeResponse(prime));
                })]
            }
            CounterAction::NthPrimeResponse(prime) => {
                state.alert_nth_prime = prime;
                state.is_nth_prime_request_in_flight = false;
                vec![]
            }
            CounterAction::AlertDismissed => {
                state.alert_nth_prime = None;
                vec![]
            }
        }
    }
}

pub mod prime_modal {
    use tca::Effects;

    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct PrimeModalState {
        pub count: i32,
        pub favorite_primes: Vec<i32>,
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum PrimeModalAction {
        SaveFavoritePrimeTapped,
        RemoveFavoritePrimeTapped,
    }

    pub fn reducer(state: &mut PrimeModalState, action: PrimeModalAction) -> Effects<PrimeModalAction> {
        match action {
            PrimeModalAction::SaveFavoritePrimeTapped => {
                state.favorite_primes.push(state.count);
            }
            PrimeModalAction::RemoveFavoritePrimeTapped => {
                let count = state.count;
                state.favorite_primes.retain(|&prime| prime != count);
            }
        }
        vec![]
    }
}

pub mod favorite_primes {
    use tca::Effects;

    #[derive(Clone, Debug, PartialEq)]
    pub enum FavoritePrimesAction {
        DeleteFavoritePrimes(Vec<usize>),
    }

    pub fn reducer(state: &mut Vec<i32>, action: FavoritePrimesAction) -> Effects<FavoritePrimesAction> {
        match action {
            FavoritePrimesAction::DeleteFavoritePrimes(mut indices) => {
                indices.sort_unstable();
                indices.dedup();
                for index in indices.into_iter().rev() {
                    if index < state.len() {
                        state.remove(index);
                    }
                }
            }
        }
        vec![]
    }
}

use counter::{CounterAction, CounterState};
use favorite_primes::FavoritePrimesAction;
use prime_modal::{PrimeModalAction, PrimeModalState};

#[derive(Clone, Debug, PartialEq)]
pub enum ActivityKind {
    AddedFavoritePrime(i32),
    RemovedFavoritePrime(i32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub kind: ActivityKind,
    pub timestamp: SystemTime,
}

impl Activity {
    fn now(kind: ActivityKind) -> Self {
        Self {
            kind,
            timestamp: SystemTime::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub bio: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub count: i32,
    pub favorite_primes: Vec<i32>,
    pub activity_feed: Vec<Activity>,
    pub logged_in_user: Option<User>,
    pub alert_nth_prime: Option<i32>,
    pub is_nth_prime_request_in_flight: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AppAction {
    Counter(CounterAction),
    PrimeModal(PrimeModalAction),
    FavoritePrimes(FavoritePrimesAction),
}

pub fn counter_state() -> Lens<AppState, CounterState> {
    Lens::new(
        |app: &AppState| CounterState {
            count: app.count,
            alert_nth_prime: app.alert_nth_prime,
            is_nth_prime_request_in_flight: app.is_nth_prime_request_in_flight,
        },
        |app: &mut AppState, counter: CounterState| {
            app.count = counter.count;
            app.alert_nth_prime = counter.alert_nth_prime;
            app.is_nth_prime_request_in_flight = counter.is_nth_prime_request_in_flight;
        },
    )
}

pub fn prime_modal_state() -> Lens<AppState, PrimeModalState> {
    Lens::new(
        |app: &AppState| PrimeModalState {
            count: app.count,
            favorite_primes: app.favorite_primes.clone(),
        },
        |app: &mut AppState, modal: PrimeModalState| {
            app.count = modal.count;
            app.favorite_primes = modal.favorite_primes;
        },
    )
}

pub fn counter_action() -> CasePath<AppAction, CounterAction> {
    case_path!(AppAction::Counter)
}

pub fn prime_modal_action() -> CasePath<AppAction, PrimeModalAction> {
    case_path!(AppAction::PrimeModal)
}

pub fn favorite_primes_action() -> CasePath<AppAction, FavoritePrimesAction> {
    case_path!(AppAction::FavoritePrimes)
}

/// Appends to the activity feed for every favorite added or removed. Runs
/// ahead of the feature reducers so removals can still see what is removed.
pub fn activity_feed(state: &mut AppState, action: AppAction) -> Effects<AppAction> {
    match action {
        AppAction::Counter(_) => {}
        AppAction::PrimeModal(PrimeModalAction::RemoveFavoritePrimeTapped) => {
            let kind = ActivityKind::RemovedFavoritePrime(state.count);
            state.activity_feed.push(Activity::now(kind));
        }
        AppAction::PrimeModal(PrimeModalAction::SaveFavoritePrimeTapped) => {
            let kind = ActivityKind::AddedFavoritePrime(state.count);
            state.activity_feed.push(Activity::now(kind));
        }
        AppAction::FavoritePrimes(FavoritePrimesAction::DeleteFavoritePrimes(indices)) => {
            for index in indices {
                if let Some(&prime) = state.favorite_primes.get(index) {
                    let kind = ActivityKind::RemovedFavoritePrime(prime);
                    state.activity_feed.push(Activity::now(kind));
                }
            }
        }
    }
    vec![]
}

pub fn app_reducer() -> impl Reducer<AppState, AppAction> + Send + Sync + 'static {
    combine![
        activity_feed,
        counter::reducer.pullback(counter_state(), counter_action()),
        prime_modal::reducer.pullback(prime_modal_state(), prime_modal_action()),
        favorite_primes::reducer.pullback(
            lens!(AppState, favorite_primes),
            favorite_primes_action()
        ),
    ]
    .logging()
}

pub fn is_prime(p: i32) -> bool {
    if p <= 1 {
        return false;
    }
    if p <= 3 {
        return true;
    }
    (2..).take_while(|i| i * i <= p).all(|i| p % i != 0)
}

/// The nth prime, 1-based. `None` when there is no such prime.
pub fn nth_prime(n: i32) -> Option<i32> {
    let n = usize::try_from(n).ok().filter(|&n| n > 0)?;
    (2..).filter(|&p| is_prime(p)).nth(n - 1)
}
