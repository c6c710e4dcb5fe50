//! Map interaction controller
//!
//! Turns user input (search box, from/to fields) and position updates into
//! geocoding and routing lookups, and renders the results as overlays on a
//! [`MapView`]. One controller lives for the whole session and owns all UI
//! state: the place cache, the last GPS fix, the overlay handles and the
//! panel texts.
//!
//! State sits behind a single mutex that is never held across an await, so
//! each render (remove old overlay, add new one) is atomic with respect to
//! every other render.

pub mod animate;
pub mod debounce;
pub mod slot;

#[cfg(test)]
pub(crate) mod testing;

use crate::config::Config;
use crate::constants::messages;
use crate::constants::style;
use crate::coord::{Bounds, Coordinate};
use crate::error::{Error, Result};
use crate::geo::nominatim::NominatimBackend;
use crate::geo::{get_geocoder, GeoBackend, PlaceResult};
use crate::location::{Position, PositionError, PositionEvent, PositionSource, WatchOptions};
use crate::map::scene::{MapScene, SceneSnapshot};
use crate::map::{Layer, LayerId, MapView, Popup};
use crate::routing::osrm::OsrmBackend;
use crate::routing::{get_router, RouteBackend, RouteResult};
use animate::ArrowAnimator;
use debounce::Debouncer;
use serde::{Deserialize, Serialize};
use slot::RequestSlot;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Text regions of the UI
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Search status line
    pub status: String,
    /// Route distance or route error
    pub distance_result: String,
    /// Value of the "from" input
    pub from_field: String,
    /// One-time alert, set at most once per session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
}

/// Last GPS fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub coord: Coordinate,
    pub accuracy_m: f64,
}

/// Handles of the overlays currently on the map, at most one of each
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlays {
    pub search_marker: Option<LayerId>,
    pub user_marker: Option<LayerId>,
    pub accuracy_circle: Option<LayerId>,
    pub route_line: Option<LayerId>,
    pub arrow_marker: Option<LayerId>,
}

/// Tunables of the controller
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub search_zoom: u8,
    pub location_zoom: u8,
    pub pulse_radius_m: f64,
    pub pulse_duration: Duration,
    pub route_padding: u32,
    pub frame_interval: Duration,
    pub debounce: Duration,
    pub watch: WatchOptions,
}

impl ControllerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            search_zoom: config.map.search_zoom,
            location_zoom: config.map.location_zoom,
            pulse_radius_m: config.map.pulse_radius_m,
            pulse_duration: Duration::from_millis(config.map.pulse_ms),
            route_padding: config.map.route_padding,
            frame_interval: Duration::from_millis(config.map.frame_ms.max(1)),
            debounce: Duration::from_millis(config.map.debounce_ms),
            watch: config.geolocation.watch_options(),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Default)]
struct ControllerState {
    panel: Panel,
    /// Keyed by normalized query; never evicted
    cache: HashMap<String, PlaceResult>,
    user_location: Option<UserLocation>,
    overlays: Overlays,
    search: RequestSlot,
    arrow: ArrowAnimator,
}

/// The map interaction controller
pub struct MapController<G, R, M = MapScene> {
    geocoder: G,
    router: R,
    map: Arc<M>,
    settings: ControllerSettings,
    search_timer: Debouncer,
    state: Mutex<ControllerState>,
}

/// Normalize search text for lookup and cache keys
pub fn normalize_query(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether an endpoint field refers to the user's own position
pub fn is_my_location(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(messages::MY_LOCATION)
}

impl<G, R, M> MapController<G, R, M>
where
    G: GeoBackend,
    R: RouteBackend,
    M: MapView,
{
    pub fn new(geocoder: G, router: R, map: Arc<M>, settings: ControllerSettings) -> Self {
        let search_timer = Debouncer::new(settings.debounce);
        Self {
            geocoder,
            router,
            map,
            settings,
            search_timer,
            state: Mutex::new(ControllerState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn map(&self) -> &Arc<M> {
        &self.map
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Current panel texts
    pub fn panel(&self) -> Panel {
        self.lock().panel.clone()
    }

    /// Handles of the overlays on the map
    pub fn overlays(&self) -> Overlays {
        self.lock().overlays
    }

    pub fn user_location(&self) -> Option<UserLocation> {
        self.lock().user_location
    }

    /// Number of cached places
    pub fn cached_places(&self) -> usize {
        self.lock().cache.len()
    }

    /// Whether a geocode search is awaiting its response
    pub fn search_in_flight(&self) -> bool {
        self.lock().search.is_busy()
    }

    // ----------------------------------------------------------------
    // Search
    // ----------------------------------------------------------------

    /// Debounced search: only the last trigger within the delay executes
    pub fn trigger_search(self: &Arc<Self>, text: impl Into<String>) {
        let this = Arc::clone(self);
        let text = text.into();
        self.search_timer.trigger(async move {
            this.search(&text).await;
        });
    }

    /// Execute a search immediately
    ///
    /// Supersedes any search still waiting for the geocoder: its request is
    /// aborted and a late response is discarded.
    pub async fn search(self: &Arc<Self>, text: &str) {
        let query = normalize_query(text);
        if query.is_empty() {
            self.lock().panel.status = messages::ENTER_PLACE.to_string();
            return;
        }

        let ticket = {
            let mut state = self.lock();
            let ticket = state.search.claim();

            if let Some(place) = state.cache.get(&query).cloned() {
                debug!("Cache hit for '{}'", query);
                self.render_place(&mut state, &place);
                return;
            }

            state.panel.status = messages::SEARCHING.to_string();
            ticket
        };

        let this = Arc::clone(self);
        let lookup = query.clone();
        let request = tokio::spawn(async move { this.geocoder.geocode(&lookup).await });
        self.lock().search.attach(ticket, request.abort_handle());

        let outcome = request.await;

        let mut state = self.lock();
        state.search.release(ticket);

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => {
                debug!("Search for '{}' superseded", query);
                return;
            }
            Err(e) => Err(Error::Geocoding(format!("Lookup task failed: {}", e))),
        };

        if let Ok(Some(place)) = &outcome {
            state.cache.insert(query.clone(), place.clone());
        }

        if !state.search.is_current(ticket) {
            debug!("Discarding stale result for '{}'", query);
            return;
        }

        match outcome {
            Ok(Some(place)) => self.render_place(&mut state, &place),
            Ok(None) => {
                debug!("No match for '{}'", query);
                state.panel.status = messages::NO_MATCH.to_string();
            }
            Err(e) => {
                warn!("Search for '{}' failed: {}", query, e);
                state.panel.status = messages::NETWORK_ERROR.to_string();
            }
        }
    }

    fn render_place(&self, state: &mut ControllerState, place: &PlaceResult) {
        state.panel.status.clear();

        if let Some(previous) = state.overlays.search_marker.take() {
            self.map.remove_layer(previous);
        }

        self.map.set_view(place.coord, self.settings.search_zoom, true);

        let marker = self.map.add_layer(Layer::Marker {
            at: place.coord,
            icon: style::GLOW_MARKER_CLASS.to_string(),
            popup: Some(Popup {
                text: place.display_name.clone(),
                open: true,
            }),
        });
        state.overlays.search_marker = Some(marker);

        self.pulse(place.coord);
        info!("Showing {} at {}", place.display_name, place.coord);
    }

    /// Short-lived acknowledgment circle
    fn pulse(&self, at: Coordinate) {
        let circle = self.map.add_layer(Layer::Circle {
            center: at,
            radius_m: self.settings.pulse_radius_m,
            color: style::ACCENT_COLOR.to_string(),
            fill_opacity: style::PULSE_FILL_OPACITY,
        });

        let map = Arc::clone(&self.map);
        let lifetime = self.settings.pulse_duration;
        tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            map.remove_layer(circle);
        });
    }

    // ----------------------------------------------------------------
    // Distance & route
    // ----------------------------------------------------------------

    /// Resolve both endpoints, fetch a driving route and render it
    pub async fn route(&self, from: &str, to: &str) {
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            self.set_distance_result(messages::ENTER_BOTH);
            return;
        }

        let (a, b) = match tokio::join!(self.resolve(from), self.resolve(to)) {
            (Ok(Some(a)), Ok(Some(b))) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                warn!("Resolving '{}' -> '{}' failed: {}", from, to, e);
                self.set_distance_result(messages::NETWORK_ERROR);
                return;
            }
            _ => {
                debug!("Could not resolve '{}' -> '{}'", from, to);
                self.set_distance_result(messages::LOCATION_NOT_FOUND);
                return;
            }
        };

        match self.router.route(a, b).await {
            Ok(Some(route)) => self.render_route(route),
            Ok(None) => {
                warn!("No route between {} and {}", a, b);
                self.set_distance_result(messages::ROUTE_UNAVAILABLE);
            }
            Err(e) => {
                warn!("Routing {} -> {} failed: {}", a, b, e);
                self.set_distance_result(messages::ROUTE_UNAVAILABLE);
            }
        }
    }

    /// Resolve an endpoint field to a coordinate
    ///
    /// "my location" short-circuits to the last GPS fix when there is one;
    /// everything else goes to the geocoder.
    pub async fn resolve(&self, text: &str) -> Result<Option<Coordinate>> {
        if is_my_location(text) {
            if let Some(fix) = self.user_location() {
                return Ok(Some(fix.coord));
            }
        }
        Ok(self.geocoder.geocode(text).await?.map(|place| place.coord))
    }

    fn set_distance_result(&self, text: &str) {
        self.lock().panel.distance_result = text.to_string();
    }

    fn render_route(&self, route: RouteResult) {
        let mut state = self.lock();

        if let Some(line) = state.overlays.route_line.take() {
            self.map.remove_layer(line);
        }
        state.arrow.stop();
        if let Some(arrow) = state.overlays.arrow_marker.take() {
            self.map.remove_layer(arrow);
        }

        let line = self.map.add_layer(Layer::Polyline {
            path: route.path.clone(),
            color: style::ACCENT_COLOR.to_string(),
            weight: style::ROUTE_LINE_WEIGHT,
            class: style::ROUTE_LINE_CLASS.to_string(),
        });
        state.overlays.route_line = Some(line);

        if let Some(bounds) = Bounds::of_path(&route.path) {
            let padding = self.settings.route_padding;
            self.map.fit_bounds(bounds, [padding, padding]);
        }

        state.overlays.arrow_marker = state.arrow.start(
            Arc::clone(&self.map),
            route.path.clone(),
            self.settings.frame_interval,
        );

        state.panel.distance_result = format!("Road distance: {}", route.distance_label());
        info!("Route rendered: {} over {} points", route.distance_label(), route.path.len());
    }

    // ----------------------------------------------------------------
    // Geolocation tracking
    // ----------------------------------------------------------------

    /// Subscribe to `source` and render every fix until the stream ends
    ///
    /// Returns the tracking task, or None when the source cannot provide
    /// positions (an alert is shown once in that case).
    pub fn start_tracking<S>(self: &Arc<Self>, source: &S) -> Option<JoinHandle<()>>
    where
        S: PositionSource + ?Sized,
    {
        match source.watch(self.settings.watch) {
            Ok(events) => {
                info!("Tracking position (timeout {:?})", self.settings.watch.timeout);
                Some(tokio::spawn(Arc::clone(self).track(events)))
            }
            Err(Error::GeolocationUnsupported) => {
                self.alert_once(messages::GEOLOCATION_UNSUPPORTED);
                None
            }
            Err(e) => {
                warn!("Could not start position tracking: {}", e);
                self.lock().panel.status = messages::WAITING_FOR_GPS.to_string();
                None
            }
        }
    }

    async fn track(self: Arc<Self>, mut events: mpsc::Receiver<PositionEvent>) {
        let timeout = self.settings.watch.timeout;
        loop {
            // zero means no timeout
            let next = if timeout.is_zero() {
                Ok(events.recv().await)
            } else {
                tokio::time::timeout(timeout, events.recv()).await
            };

            match next {
                Ok(Some(Ok(fix))) => self.handle_position(fix),
                Ok(Some(Err(e))) => self.handle_position_error(e),
                Ok(None) => {
                    debug!("Position stream closed");
                    break;
                }
                Err(_) => self.handle_position_error(PositionError::Timeout),
            }
        }
    }

    /// Render a GPS fix and remember it as the user's location
    pub fn handle_position(&self, fix: Position) {
        let mut state = self.lock();
        state.user_location = Some(UserLocation {
            coord: fix.coord,
            accuracy_m: fix.accuracy_m,
        });

        if let Some(marker) = state.overlays.user_marker.take() {
            self.map.remove_layer(marker);
        }
        if let Some(circle) = state.overlays.accuracy_circle.take() {
            self.map.remove_layer(circle);
        }

        self.map.set_view(fix.coord, self.settings.location_zoom, false);

        state.overlays.user_marker = Some(self.map.add_layer(Layer::Marker {
            at: fix.coord,
            icon: style::GLOW_MARKER_CLASS.to_string(),
            popup: Some(Popup {
                text: messages::YOU_ARE_HERE.to_string(),
                open: false,
            }),
        }));
        state.overlays.accuracy_circle = Some(self.map.add_layer(Layer::Circle {
            center: fix.coord,
            radius_m: fix.accuracy_m,
            color: style::ACCENT_COLOR.to_string(),
            fill_opacity: style::ACCURACY_FILL_OPACITY,
        }));

        state.panel.from_field = messages::MY_LOCATION.to_string();
        if state.panel.status == messages::WAITING_FOR_GPS {
            state.panel.status.clear();
        }
        debug!("Position fix {} ±{:.0} m", fix.coord, fix.accuracy_m);
    }

    /// Report a non-fatal position error; more fixes may still arrive
    pub fn handle_position_error(&self, error: PositionError) {
        debug!("Position error: {}", error);
        self.lock().panel.status = messages::WAITING_FOR_GPS.to_string();
    }

    fn alert_once(&self, text: &str) {
        let mut state = self.lock();
        if state.panel.alert.is_none() {
            warn!("{}", text);
            state.panel.alert = Some(text.to_string());
        }
    }
}

/// Everything a front-end needs to draw the current UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub panel: Panel,
    pub user_location: Option<UserLocation>,
    pub overlays: Overlays,
    pub scene: SceneSnapshot,
}

impl<G, R> MapController<G, R, MapScene>
where
    G: GeoBackend,
    R: RouteBackend,
{
    /// Consistent copy of panel, overlay handles and scene
    pub fn view(&self) -> ViewState {
        let state = self.lock();
        ViewState {
            panel: state.panel.clone(),
            user_location: state.user_location,
            overlays: state.overlays,
            scene: self.map.snapshot(),
        }
    }
}

/// Controller wired to the real services
pub type LiveController = MapController<NominatimBackend, OsrmBackend, MapScene>;

/// Build a controller from configuration
pub fn live(config: &Config) -> Result<Arc<LiveController>> {
    Ok(Arc::new(MapController::new(
        get_geocoder(&config.services)?,
        get_router(&config.services)?,
        Arc::new(MapScene::new()),
        ControllerSettings::from_config(config),
    )))
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeGeocoder, FakeRouter, RouterReply};
    use super::*;
    use crate::location::channel::ChannelSource;
    use crate::location::Unsupported;
    use crate::map::{LayerKind, Viewport};
    use approx::assert_relative_eq;

    type Controller = MapController<FakeGeocoder, FakeRouter, MapScene>;

    fn controller(geocoder: FakeGeocoder, router: FakeRouter) -> Arc<Controller> {
        Arc::new(MapController::new(
            geocoder,
            router,
            Arc::new(MapScene::new()),
            ControllerSettings::default(),
        ))
    }

    fn default_controller() -> Arc<Controller> {
        controller(FakeGeocoder::with_cities(), FakeRouter::straight(12345.0))
    }

    fn popup_text(ctl: &Controller, id: Option<LayerId>) -> String {
        match id.and_then(|id| ctl.map().snapshot().get(id).cloned()) {
            Some(Layer::Marker { popup: Some(popup), .. }) => popup.text,
            other => panic!("expected marker with popup, got {:?}", other),
        }
    }

    fn glow_markers(ctl: &Controller) -> usize {
        ctl.map()
            .snapshot()
            .markers_with_icon(style::GLOW_MARKER_CLASS)
            .len()
    }

    fn arrow_markers(ctl: &Controller) -> usize {
        ctl.map()
            .snapshot()
            .markers_with_icon(style::ARROW_ICON_CLASS)
            .len()
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  New York "), "new york");
        assert_eq!(normalize_query("   "), "");
    }

    #[test]
    fn test_is_my_location() {
        assert!(is_my_location("My Location"));
        assert!(is_my_location(" my location "));
        assert!(is_my_location("MY LOCATION"));
        assert!(!is_my_location("my house"));
    }

    // ---- search ----

    #[tokio::test]
    async fn test_search_renders_marker_and_popup() {
        let ctl = default_controller();
        ctl.search("Berlin").await;

        let overlays = ctl.overlays();
        assert_eq!(popup_text(&ctl, overlays.search_marker), "Berlin, Germany");
        assert_eq!(ctl.panel().status, "");

        let snap = ctl.map().snapshot();
        match snap.get(overlays.search_marker.unwrap()) {
            Some(Layer::Marker { popup: Some(p), .. }) => assert!(p.open),
            other => panic!("unexpected {:?}", other),
        }
        match snap.viewport {
            Viewport::Center { center, zoom, animate } => {
                assert_relative_eq!(center.lat, 52.52, epsilon = 1e-9);
                assert_eq!(zoom, 14);
                assert!(animate);
            }
            other => panic!("unexpected viewport {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_replaces_previous_marker() {
        let ctl = default_controller();
        ctl.search("Berlin").await;
        let first = ctl.overlays().search_marker;
        ctl.search("Paris").await;

        let overlays = ctl.overlays();
        assert_ne!(overlays.search_marker, first);
        assert!(ctl.map().snapshot().get(first.unwrap()).is_none());
        assert_eq!(glow_markers(&ctl), 1);
        assert_eq!(popup_text(&ctl, overlays.search_marker), "Paris, France");
    }

    #[tokio::test]
    async fn test_repeated_search_uses_cache() {
        let ctl = default_controller();
        ctl.search("Berlin").await;
        ctl.search("  BERLIN ").await;

        assert_eq!(ctl.geocoder.calls(), vec!["berlin"]);
        assert_eq!(ctl.cached_places(), 1);
        assert_eq!(glow_markers(&ctl), 1);
        assert_eq!(popup_text(&ctl, ctl.overlays().search_marker), "Berlin, Germany");
    }

    #[tokio::test]
    async fn test_empty_search_reports_without_lookup() {
        let ctl = default_controller();
        ctl.search("   ").await;

        assert_eq!(ctl.panel().status, messages::ENTER_PLACE);
        assert!(ctl.geocoder.calls().is_empty());
        assert!(ctl.map().snapshot().layers.is_empty());
    }

    #[tokio::test]
    async fn test_no_match_keeps_previous_marker() {
        let ctl = default_controller();
        ctl.search("Berlin").await;
        let marker = ctl.overlays().search_marker;

        ctl.search("Atlantis").await;

        assert_eq!(ctl.panel().status, messages::NO_MATCH);
        assert_eq!(ctl.overlays().search_marker, marker);
        assert_eq!(glow_markers(&ctl), 1);
        assert_eq!(ctl.cached_places(), 1);
    }

    #[tokio::test]
    async fn test_network_error_keeps_previous_marker() {
        let ctl = controller(
            FakeGeocoder::with_cities().failing("offline town"),
            FakeRouter::straight(1.0),
        );
        ctl.search("Berlin").await;
        let marker = ctl.overlays().search_marker;

        ctl.search("Offline Town").await;

        assert_eq!(ctl.panel().status, messages::NETWORK_ERROR);
        assert_eq!(ctl.overlays().search_marker, marker);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_disappears_after_two_seconds() {
        let ctl = default_controller();
        ctl.search("Berlin").await;
        assert_eq!(ctl.map().snapshot().count(LayerKind::Circle), 1);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(ctl.map().snapshot().count(LayerKind::Circle), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(ctl.map().snapshot().count(LayerKind::Circle), 0);
        assert_eq!(glow_markers(&ctl), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_runs_only_last_trigger() {
        let ctl = default_controller();
        ctl.trigger_search("Berlin");
        tokio::time::sleep(Duration::from_millis(100)).await;
        ctl.trigger_search("Paris");
        tokio::time::sleep(Duration::from_millis(350)).await;

        assert_eq!(ctl.geocoder.calls(), vec!["paris"]);
        assert_eq!(popup_text(&ctl, ctl.overlays().search_marker), "Paris, France");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_never_overwrites_newer_render() {
        let ctl = controller(
            FakeGeocoder::with_cities().delayed("berlin", Duration::from_secs(1)),
            FakeRouter::straight(1.0),
        );

        let slow = {
            let ctl = Arc::clone(&ctl);
            tokio::spawn(async move { ctl.search("Berlin").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(ctl.search_in_flight());
        assert_eq!(ctl.panel().status, messages::SEARCHING);

        ctl.search("Paris").await;
        slow.await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(popup_text(&ctl, ctl.overlays().search_marker), "Paris, France");
        assert_eq!(glow_markers(&ctl), 1);
        assert_eq!(ctl.panel().status, "");
        assert!(!ctl.search_in_flight());
        // the aborted request never resolved, so nothing was cached for it
        assert_eq!(ctl.cached_places(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_supersedes_in_flight_search() {
        let ctl = controller(
            FakeGeocoder::with_cities().delayed("berlin", Duration::from_secs(1)),
            FakeRouter::straight(1.0),
        );
        ctl.search("Paris").await;

        let slow = {
            let ctl = Arc::clone(&ctl);
            tokio::spawn(async move { ctl.search("Berlin").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctl.search("paris").await;
        slow.await.unwrap();

        assert_eq!(popup_text(&ctl, ctl.overlays().search_marker), "Paris, France");
    }

    // ---- route ----

    #[tokio::test]
    async fn test_route_renders_line_arrow_and_distance() {
        let ctl = default_controller();
        ctl.route("Berlin", "Paris").await;

        let snap = ctl.map().snapshot();
        assert_eq!(snap.count(LayerKind::Polyline), 1);
        assert_eq!(arrow_markers(&ctl), 1);
        assert!(matches!(snap.viewport, Viewport::Fit { padding: [40, 40], .. }));
        assert_eq!(ctl.panel().distance_result, "Road distance: 12.35 km");
        assert_eq!(ctl.router.calls(), 1);
    }

    #[tokio::test]
    async fn test_my_location_short_circuits_geocoding() {
        let ctl = default_controller();
        ctl.handle_position(Position::now(Coordinate::new(48.1, 11.6), 25.0));
        ctl.route("My Location", "Paris").await;

        assert_eq!(ctl.geocoder.calls(), vec!["Paris"]);
        let (from, _) = ctl.router.last_request().unwrap();
        assert_eq!(from, Coordinate::new(48.1, 11.6));
        assert_eq!(ctl.panel().distance_result, "Road distance: 12.35 km");
    }

    #[tokio::test]
    async fn test_my_location_without_fix_falls_back_to_geocoder() {
        let ctl = default_controller();
        ctl.route("my location", "Paris").await;

        assert!(ctl.geocoder.calls().contains(&"my location".to_string()));
        assert_eq!(ctl.panel().distance_result, messages::LOCATION_NOT_FOUND);
        assert!(ctl.overlays().route_line.is_none());
    }

    #[tokio::test]
    async fn test_blank_endpoint_rejected_without_calls() {
        let ctl = default_controller();
        ctl.route("Berlin", "  ").await;

        assert_eq!(ctl.panel().distance_result, messages::ENTER_BOTH);
        assert!(ctl.geocoder.calls().is_empty());
        assert_eq!(ctl.router.calls(), 0);
    }

    #[tokio::test]
    async fn test_unresolved_endpoint_renders_nothing() {
        let ctl = default_controller();
        ctl.route("Berlin", "Atlantis").await;

        assert_eq!(ctl.panel().distance_result, messages::LOCATION_NOT_FOUND);
        assert_eq!(ctl.router.calls(), 0);
        assert!(ctl.map().snapshot().layers.is_empty());
    }

    #[tokio::test]
    async fn test_resolution_network_error() {
        let ctl = controller(
            FakeGeocoder::with_cities().failing("offline town"),
            FakeRouter::straight(1.0),
        );
        ctl.route("Offline Town", "Paris").await;

        assert_eq!(ctl.panel().distance_result, messages::NETWORK_ERROR);
        assert_eq!(ctl.router.calls(), 0);
    }

    #[tokio::test]
    async fn test_routing_failure_keeps_previous_route() {
        let ctl = controller(
            FakeGeocoder::with_cities(),
            FakeRouter::sequence(
                vec![RouterReply::Route(12345.0), RouterReply::NoRoute],
                RouterReply::Fail,
            ),
        );
        ctl.route("Berlin", "Paris").await;
        let overlays = ctl.overlays();

        ctl.route("Paris", "Berlin").await;
        assert_eq!(ctl.panel().distance_result, messages::ROUTE_UNAVAILABLE);
        assert_eq!(ctl.overlays(), overlays);

        ctl.route("Paris", "Berlin").await;
        assert_eq!(ctl.panel().distance_result, messages::ROUTE_UNAVAILABLE);
        assert_eq!(ctl.overlays(), overlays);
        assert_eq!(ctl.map().snapshot().count(LayerKind::Polyline), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_routes_leave_single_line_and_arrow() {
        let ctl = controller(
            FakeGeocoder::with_cities().delayed("paris", Duration::from_millis(30)),
            FakeRouter::straight(5000.0),
        );

        tokio::join!(
            ctl.route("Berlin", "Paris"),
            ctl.route("Paris", "Berlin"),
            ctl.route("Berlin", "Berlin"),
        );
        ctl.route("Paris", "Paris").await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(ctl.map().snapshot().count(LayerKind::Polyline), 1);
        assert_eq!(arrow_markers(&ctl), 1);
        assert_eq!(ctl.router.calls(), 4);
    }

    // ---- tracking ----

    #[tokio::test]
    async fn test_position_fix_renders_marker_and_circle() {
        let ctl = default_controller();
        ctl.handle_position(Position::now(Coordinate::new(48.1, 11.6), 25.0));
        ctl.handle_position(Position::now(Coordinate::new(48.2, 11.7), 12.0));

        let overlays = ctl.overlays();
        let snap = ctl.map().snapshot();
        assert_eq!(snap.count(LayerKind::Marker), 1);
        assert_eq!(snap.count(LayerKind::Circle), 1);
        assert_eq!(popup_text(&ctl, overlays.user_marker), messages::YOU_ARE_HERE);

        match snap.get(overlays.accuracy_circle.unwrap()) {
            Some(Layer::Circle { radius_m, center, .. }) => {
                assert_eq!(*radius_m, 12.0);
                assert_eq!(*center, Coordinate::new(48.2, 11.7));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            snap.viewport,
            Viewport::Center {
                center: Coordinate::new(48.2, 11.7),
                zoom: 16,
                animate: false
            }
        );
        assert_eq!(ctl.panel().from_field, messages::MY_LOCATION);
        assert_eq!(
            ctl.user_location(),
            Some(UserLocation {
                coord: Coordinate::new(48.2, 11.7),
                accuracy_m: 12.0
            })
        );
    }

    #[tokio::test]
    async fn test_tracking_consumes_position_stream() {
        let ctl = default_controller();
        let source = ChannelSource::new();
        let task = ctl.start_tracking(&source).unwrap();

        source.publish(Err(PositionError::PositionUnavailable)).await;
        source.publish(Ok(Position::now(Coordinate::new(1.0, 2.0), 30.0))).await;
        drop(source);
        task.await.unwrap();

        assert_eq!(ctl.panel().status, messages::WAITING_FOR_GPS);
        assert_eq!(ctl.user_location().unwrap().coord, Coordinate::new(1.0, 2.0));
        assert_eq!(ctl.panel().from_field, messages::MY_LOCATION);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_source_reports_timeout() {
        let ctl = default_controller();
        let source = ChannelSource::new();
        let _task = ctl.start_tracking(&source).unwrap();

        tokio::time::sleep(Duration::from_millis(9_900)).await;
        assert_eq!(ctl.panel().status, "");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ctl.panel().status, messages::WAITING_FOR_GPS);

        source.publish(Ok(Position::now(Coordinate::new(1.0, 2.0), 30.0))).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(ctl.user_location().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ip_cadence_keeps_status_clear() {
        let ctl = default_controller();
        let source = Arc::new(ChannelSource::new());
        let _task = ctl.start_tracking(source.as_ref()).unwrap();

        let cadence = Config::default().geolocation.ip_poll_interval();
        let feeder = Arc::clone(&source);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cadence);
            loop {
                ticker.tick().await;
                feeder.publish(Ok(Position::now(Coordinate::new(1.0, 2.0), 5000.0))).await;
            }
        });

        for _ in 0..8 {
            tokio::time::sleep(Duration::from_secs(5)).await;
            assert_eq!(ctl.panel().status, "");
        }
        assert!(ctl.user_location().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fix_clears_waiting_status() {
        let ctl = default_controller();
        let source = ChannelSource::new();
        let _task = ctl.start_tracking(&source).unwrap();

        tokio::time::sleep(Duration::from_millis(10_100)).await;
        assert_eq!(ctl.panel().status, messages::WAITING_FOR_GPS);

        source.publish(Ok(Position::now(Coordinate::new(1.0, 2.0), 30.0))).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(ctl.panel().status, "");
    }

    #[tokio::test]
    async fn test_fix_keeps_search_status() {
        let ctl = default_controller();
        ctl.search("atlantis").await;
        ctl.handle_position(Position::now(Coordinate::new(1.0, 2.0), 30.0));
        assert_eq!(ctl.panel().status, messages::NO_MATCH);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_waits_without_spinning() {
        let settings = ControllerSettings {
            watch: WatchOptions {
                timeout: Duration::ZERO,
                ..ControllerSettings::default().watch
            },
            ..ControllerSettings::default()
        };
        let ctl = Arc::new(MapController::new(
            FakeGeocoder::with_cities(),
            FakeRouter::straight(12345.0),
            Arc::new(MapScene::new()),
            settings,
        ));
        let source = ChannelSource::new();
        let _task = ctl.start_tracking(&source).unwrap();

        for _ in 0..100 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ctl.panel().status, "");

        source.publish(Ok(Position::now(Coordinate::new(1.0, 2.0), 30.0))).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(ctl.user_location().is_some());
    }

    #[tokio::test]
    async fn test_unsupported_geolocation_alerts_once() {
        let ctl = default_controller();
        assert!(ctl.start_tracking(&Unsupported).is_none());
        assert!(ctl.start_tracking(&Unsupported).is_none());

        assert_eq!(ctl.panel().alert.as_deref(), Some(messages::GEOLOCATION_UNSUPPORTED));
        assert!(ctl.map().snapshot().layers.is_empty());
    }

    // ---- view ----

    #[tokio::test]
    async fn test_view_matches_overlays_and_scene() {
        let ctl = default_controller();
        ctl.handle_position(Position::now(Coordinate::new(52.0, 13.0), 40.0));
        ctl.route("my location", "Paris").await;

        let view = ctl.view();
        assert_eq!(view.panel.distance_result, "Road distance: 12.35 km");
        assert_eq!(view.overlays, ctl.overlays());
        assert!(matches!(
            view.scene.get(view.overlays.route_line.unwrap()),
            Some(Layer::Polyline { .. })
        ));
        assert!(matches!(view.scene.viewport, Viewport::Fit { .. }));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["panel"]["from_field"], "My Location");
        assert!(json["panel"].get("alert").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_controller_stops_arrow() {
        let ctl = default_controller();
        ctl.route("Berlin", "Paris").await;

        let map = Arc::clone(ctl.map());
        let arrow = ctl.overlays().arrow_marker.unwrap();
        drop(ctl);

        tokio::time::sleep(Duration::from_millis(5)).await;
        let parked = map.snapshot().get(arrow).cloned();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(map.snapshot().get(arrow).cloned(), parked);
    }
}
