use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::observers::Subscription;

pub trait ChangeObserver {
    type State;

    /// Stream of every state the store publishes from now on.
    fn observe(&self) -> StateStream<Self::State>;
}

/// Async view of a store's state changes.
///
/// Unbounded and never coalesced: a slow consumer still receives every state,
/// in order. The stream ends when the store is dropped.
pub struct StateStream<State> {
    receiver: mpsc::UnboundedReceiver<State>,
    _subscription: Subscription,
}

impl<State> StateStream<State> {
    pub(crate) fn new(
        receiver: mpsc::UnboundedReceiver<State>,
        subscription: Subscription,
    ) -> Self {
        Self {
            receiver,
            _subscription: subscription,
        }
    }

    pub async fn next_state(&mut self) -> Option<State> {
        self.receiver.recv().await
    }

    /// A state that was already published, without waiting.
    pub fn try_next_state(&mut self) -> Option<State> {
        self.receiver.try_recv().ok()
    }
}

impl<State> Stream for StateStream<State> {
    type Item = State;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
