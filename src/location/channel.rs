//! Position source fed from outside the process
//!
//! The browser page forwards each `watchPosition` callback to the server,
//! which publishes it here.

use crate::error::Result;
use crate::location::{Position, PositionEvent, PositionSource, WatchOptions, EVENT_BUFFER};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Default)]
struct Inner {
    subscriber: Option<mpsc::Sender<PositionEvent>>,
    last_fix: Option<Position>,
}

/// Single-subscriber source fed by `publish`
#[derive(Default)]
pub struct ChannelSource {
    inner: Mutex<Inner>,
}

impl ChannelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward an event to the current subscriber
    ///
    /// Returns false if nobody is watching.
    pub async fn publish(&self, event: PositionEvent) -> bool {
        let sender = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            if let Ok(fix) = &event {
                inner.last_fix = Some(*fix);
            }
            inner.subscriber.clone()
        };

        match sender {
            Some(sender) => sender.send(event).await.is_ok(),
            None => {
                debug!("Position event dropped: no subscriber");
                false
            }
        }
    }
}

impl PositionSource for ChannelSource {
    fn watch(&self, options: WatchOptions) -> Result<mpsc::Receiver<PositionEvent>> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(fix) = inner.last_fix.filter(|fix| fix.is_fresh(options.maximum_age)) {
            // Fresh channel with spare capacity, cannot fail
            let _ = tx.try_send(Ok(fix));
        }

        inner.subscriber = Some(tx);
        Ok(rx)
    }
}
