//! Headless run of the prime-time app.
//!
//! Each "screen" gets its own derived store and only sees its slice of the
//! state. Run with `RUST_LOG=tca=debug` to see every action and state.

#[allow(dead_code)]
mod features;

use std::time::Duration;

use anyhow::Context;
use tca::{ActionSender, ChangeObserver, Store, StoreOptions};

use features::counter::CounterAction;
use features::favorite_primes::FavoritePrimesAction;
use features::prime_modal::PrimeModalAction;
use features::{app_reducer, is_prime, AppAction, AppState};

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run())
}

async fn run() -> anyhow::Result<()> {
    let store = Store::with_options(
        AppState::default(),
        app_reducer(),
        StoreOptions::new().label("prime-time"),
    );

    let counter = store.view(
        |state: &AppState| (state.count, state.alert_nth_prime),
        AppAction::Counter,
    );
    let prime_modal = store.view(
        |state: &AppState| (state.count, state.favorite_primes.clone()),
        AppAction::PrimeModal,
    );
    let favorites = store.view(
        |state: &AppState| state.favorite_primes.clone(),
        AppAction::FavoritePrimes,
    );

    let _render = favorites.subscribe(|primes: &Vec<i32>| println!("favorite primes: {:?}", primes));

    for target in [2, 3, 5, 7] {
        while counter.state().0 < target {
            counter.try_send(CounterAction::IncrTapped)?;
        }
        let (count, saved) = prime_modal.state();
        if is_prime(count) && !saved.contains(&count) {
            prime_modal.try_send(PrimeModalAction::SaveFavoritePrimeTapped)?;
        }
    }

    let mut changes = counter.observe();
    counter.try_send(CounterAction::NthPrimeButtonTapped)?;
    let prime = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some((_, alert)) = changes.next_state().await {
            if alert.is_some() {
                return alert;
            }
        }
        None
    })
    .await
    .context("nth prime computation timed out")?
    .context("no nth prime for the current count")?;
    println!("the {}th prime is {}", counter.state().0, prime);
    counter.try_send(CounterAction::AlertDismissed)?;

    favorites.try_send(FavoritePrimesAction::DeleteFavoritePrimes(vec![0]))?;

    let state = store.state();
    println!("activity:");
    for activity in &state.activity_feed {
        println!("  {:?}", activity.kind);
    }
    Ok(())
}
