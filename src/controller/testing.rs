//! In-process fakes for the geocoding and routing backends

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::geo::{GeoBackend, PlaceResult};
use crate::routing::{RouteBackend, RouteResult};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

/// Geocoder answering from a fixed table, recording every query
#[derive(Default)]
pub struct FakeGeocoder {
    places: HashMap<String, PlaceResult>,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn with_cities() -> Self {
        let mut geocoder = Self::default();
        geocoder.add("berlin", 52.52, 13.405, "Berlin, Germany");
        geocoder.add("paris", 48.8566, 2.3522, "Paris, France");
        geocoder
    }

    fn add(&mut self, key: &str, lat: f64, lng: f64, name: &str) {
        self.places.insert(
            key.to_string(),
            PlaceResult {
                coord: Coordinate::new(lat, lng),
                display_name: name.to_string(),
            },
        );
    }

    /// Answer `key` only after `delay`
    pub fn delayed(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    /// Fail lookups of `key` with a transport error
    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    /// Queries received so far, as passed in
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl GeoBackend for FakeGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<PlaceResult>> {
        self.calls.lock().unwrap().push(query.to_string());

        let key = query.trim().to_lowercase();
        if let Some(delay) = self.delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&key) {
            return Err(Error::Geocoding("connection refused".to_string()));
        }
        Ok(self.places.get(&key).cloned())
    }
}

/// Scripted router reply
#[derive(Debug, Clone, Copy)]
pub enum RouterReply {
    /// Straight two-point route of the given length
    Route(f64),
    NoRoute,
    Fail,
}

/// Router replaying a script, then repeating a fallback reply
pub struct FakeRouter {
    script: Mutex<VecDeque<RouterReply>>,
    fallback: RouterReply,
    requests: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl FakeRouter {
    pub fn straight(distance_m: f64) -> Self {
        Self::sequence(Vec::new(), RouterReply::Route(distance_m))
    }

    pub fn sequence(script: Vec<RouterReply>, fallback: RouterReply) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<(Coordinate, Coordinate)> {
        self.requests.lock().unwrap().last().copied()
    }
}

impl RouteBackend for FakeRouter {
    async fn route(&self, from: Coordinate, to: Coordinate) -> Result<Option<RouteResult>> {
        self.requests.lock().unwrap().push((from, to));

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);

        match reply {
            RouterReply::Route(distance_m) => Ok(Some(RouteResult {
                path: vec![from, to],
                distance_m,
            })),
            RouterReply::NoRoute => Ok(None),
            RouterReply::Fail => Err(Error::Routing("connection reset".to_string())),
        }
    }
}
