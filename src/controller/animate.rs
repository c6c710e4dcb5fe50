//! Direction arrow animation
//!
//! Moves a marker along a route, one path point per frame, wrapping back to
//! the start forever. Only one animation runs at a time; starting a new one
//! stops the previous loop.

use crate::constants::style::ARROW_ICON_CLASS;
use crate::coord::Coordinate;
use crate::map::{Layer, LayerId, MapView};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Default)]
pub struct ArrowAnimator {
    running: Option<JoinHandle<()>>,
}

impl ArrowAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the arrow at the start of `path` and begin cycling it
    ///
    /// Stops any previous loop. The caller owns removing the returned
    /// marker. Returns None for an empty path.
    pub fn start<M: MapView>(
        &mut self,
        map: Arc<M>,
        path: Vec<Coordinate>,
        frame: Duration,
    ) -> Option<LayerId> {
        self.stop();

        let first = *path.first()?;
        let arrow = map.add_layer(Layer::Marker {
            at: first,
            icon: ARROW_ICON_CLASS.to_string(),
            popup: None,
        });

        self.running = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut next = 0;
            loop {
                ticker.tick().await;
                map.set_marker_position(arrow, path[next]);
                next = (next + 1) % path.len();
            }
        }));

        Some(arrow)
    }

    /// Stop the running loop, if any
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|r| !r.is_finished())
    }
}

impl Drop for ArrowAnimator {
    fn drop(&mut self) {
        self.stop();
    }
}
