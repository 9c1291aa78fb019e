/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Rendezvous hand-off between engine callbacks and the reader.
//!
//! [`EventSender::send`] returns only once a reader has taken the event, so
//! engine workers are throttled by the consumer and nothing queues up. That
//! includes the callbacks that carry heartbeats: a reader that stalls will
//! eventually stall the engine's sessions.
//!
//! [`EventReceiver::recv`] is cancel-safe. Dropping its future before it
//! completes leaves the pending event in the channel.

use crate::event::Event;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// The reader side is gone; the event was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event channel closed")]
pub struct ChannelClosed;

#[derive(Debug)]
struct Handoff {
    event: Event,
    taken: oneshot::Sender<()>,
}

/// Creates a connected sender/receiver pair.
#[must_use]
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (EventSender { tx }, EventReceiver { rx })
}

/// Sending half, cloned into each callback.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<Handoff>,
}

impl EventSender {
    /// Hands `event` to the reader and waits until it has been taken.
    ///
    /// # Errors
    /// Returns `ChannelClosed` if the receiver is dropped before taking the
    /// event.
    pub async fn send(&self, event: Event) -> Result<(), ChannelClosed> {
        let (taken, taken_rx) = oneshot::channel();
        self.tx
            .send(Handoff { event, taken })
            .await
            .map_err(|_| ChannelClosed)?;
        taken_rx.await.map_err(|_| ChannelClosed)
    }

    /// Returns true once the receiver is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half, owned by the reader.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::Receiver<Handoff>,
}

impl EventReceiver {
    /// Takes the next event, releasing its sender.
    ///
    /// Returns `None` once every sender is dropped and nothing is pending.
    pub async fn recv(&mut self) -> Option<Event> {
        let handoff = self.rx.recv().await?;
        // The sender may have given up already; the event is still ours.
        let _ = handoff.taken.send(());
        Some(handoff.event)
    }

    /// Refuses further sends. Pending events can still be received.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
