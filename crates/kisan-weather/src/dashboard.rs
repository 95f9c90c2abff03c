//! Dashboard controller.
//!
//! Owns the dashboard state machine (`Idle -> Loading -> Ready | Error`) and
//! drives the forecast source, the advisory engine and the location store.
//! Presentation observes state through `watch` receivers.
//!
//! The control lock is only taken for short synchronous sections; no lock is
//! held across an `.await`. A fetch remembers the request generation it was
//! started under and its result is dropped if the generation has moved on.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use kisan_core::{AdvisoryThresholds, Config, FetchError};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::advisory::{derive_advisories, AdvisoryFlag};
use crate::language::Language;
use crate::location::{nearby_districts, LocationStore};
use crate::prefs::Preferences;
use crate::provider::ForecastSource;
use crate::types::{ForecastSnapshot, LocationCandidate, Place};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading,
    Ready,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub active_location: Place,
    pub forecast: Option<Arc<ForecastSnapshot>>,
    /// Always derived from `forecast`
    pub advisories: BTreeSet<AdvisoryFlag>,
    pub status: Status,
    pub last_error: Option<FetchError>,
    pub language: Language,
}

impl DashboardState {
    fn new(active_location: Place, language: Language) -> Self {
        Self {
            active_location,
            forecast: None,
            advisories: BTreeSet::new(),
            status: Status::Idle,
            last_error: None,
            language,
        }
    }

    /// Last error text in the form shown to the user.
    pub fn error_message(&self) -> Option<&'static str> {
        self.last_error.as_ref().map(FetchError::user_message)
    }
}

/// What happened to a fetch trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result (success or error) was applied to state
    Applied,
    /// A newer request superseded this one; the result was ignored
    Discarded,
    /// A fetch for the same location was already in flight
    Coalesced,
}

/// Latest location search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub seq: u64,
    pub query: String,
    pub candidates: Vec<LocationCandidate>,
}

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub forecast_days: u8,
    pub refresh_interval: Duration,
    pub search_debounce: Duration,
    pub default_location: Place,
    pub thresholds: AdvisoryThresholds,
}

impl DashboardSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            forecast_days: config.dashboard.forecast_days,
            refresh_interval: Duration::from_secs(u64::from(config.dashboard.refresh_minutes) * 60),
            search_debounce: Duration::from_millis(config.dashboard.search_debounce_ms),
            default_location: Place::from(&config.dashboard.default_location),
            thresholds: config.advisory.clone(),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Default)]
struct Control {
    generation: u64,
    /// Generation of the fetch currently in flight, if any
    in_flight: Option<u64>,
}

/// Marks a fetch as in flight until it finishes or its future is dropped.
///
/// A dropped fetch (aborted task, lost `select!` branch, timeout) releases
/// the marker and puts the status back, otherwise every later refresh would
/// coalesce into a fetch that no longer exists.
struct InFlight<'a> {
    controller: &'a DashboardController,
    generation: u64,
    /// Status restored if the fetch never completes
    fallback: Status,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn new(controller: &'a DashboardController, generation: u64, fallback: Status) -> Self {
        Self {
            controller,
            generation,
            fallback,
            finished: false,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut control = self.controller.control.lock();
        if control.in_flight != Some(self.generation) {
            return;
        }
        control.in_flight = None;
        if control.generation == self.generation {
            tracing::debug!("Fetch for generation {} cancelled", self.generation);
            let fallback = self.fallback;
            self.controller.state_tx.send_if_modified(|state| {
                if state.status != Status::Loading {
                    return false;
                }
                state.status = fallback;
                true
            });
        }
    }
}

pub struct DashboardController {
    source: Arc<dyn ForecastSource>,
    locations: Arc<LocationStore>,
    prefs: Preferences,
    settings: DashboardSettings,
    control: Mutex<Control>,
    state_tx: watch::Sender<DashboardState>,
    search_seq: AtomicU64,
    search_tx: watch::Sender<SearchResults>,
}

impl DashboardController {
    /// Build an idle controller. The initial location is the last one used,
    /// or the configured default.
    pub fn new(
        source: Arc<dyn ForecastSource>,
        locations: Arc<LocationStore>,
        prefs: Preferences,
        settings: DashboardSettings,
    ) -> Self {
        let location = prefs
            .last_location()
            .unwrap_or_else(|| settings.default_location.clone());
        let (state_tx, _) = watch::channel(DashboardState::new(location, prefs.language()));
        let (search_tx, _) = watch::channel(SearchResults::default());

        Self {
            source,
            locations,
            prefs,
            settings,
            control: Mutex::new(Control::default()),
            state_tx,
            search_seq: AtomicU64::new(0),
            search_tx,
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state_tx.subscribe()
    }

    pub fn search_results(&self) -> watch::Receiver<SearchResults> {
        self.search_tx.subscribe()
    }

    pub fn locations(&self) -> &Arc<LocationStore> {
        &self.locations
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// First load for the active location.
    pub async fn mount(&self) -> FetchOutcome {
        let name = self.state_tx.borrow().active_location.name.clone();
        tracing::info!("Mounting dashboard at {}", name);
        self.refresh().await
    }

    /// Refetch the active location. A no-op while a fetch for it is in flight.
    pub async fn refresh(&self) -> FetchOutcome {
        let (guard, location) = {
            let mut control = self.control.lock();
            if control.in_flight == Some(control.generation) {
                tracing::debug!("Refresh coalesced with in-flight fetch");
                return FetchOutcome::Coalesced;
            }
            control.in_flight = Some(control.generation);

            let (location, previous) = {
                let state = self.state_tx.borrow();
                (state.active_location.clone(), state.status)
            };
            self.state_tx.send_modify(|state| state.status = Status::Loading);
            (InFlight::new(self, control.generation, previous), location)
        };

        self.run_fetch(guard, location).await
    }

    /// Switch to another location and load it.
    ///
    /// The previous location's forecast and advisories are cleared straight
    /// away, and any fetch still running for it will be discarded. Selecting
    /// the active location again is a plain refresh.
    pub async fn select_location(&self, place: Place) -> FetchOutcome {
        let same_place = self.state_tx.borrow().active_location.same_as(&place);
        if same_place {
            tracing::debug!("{} is already active", place.name);
            return self.refresh().await;
        }

        let guard = {
            let mut control = self.control.lock();
            control.generation += 1;
            control.in_flight = Some(control.generation);
            self.state_tx.send_modify(|state| {
                state.active_location = place.clone();
                state.forecast = None;
                state.advisories.clear();
                state.status = Status::Loading;
                state.last_error = None;
            });
            InFlight::new(self, control.generation, Status::Idle)
        };

        tracing::info!("Location changed to {}", place.name);
        if let Err(e) = self.prefs.set_last_location(&place) {
            tracing::warn!("Could not remember last location: {}", e);
        }

        self.run_fetch(guard, place).await
    }

    async fn run_fetch(&self, mut guard: InFlight<'_>, location: Place) -> FetchOutcome {
        let result = self
            .source
            .fetch_forecast(&location.query(), self.settings.forecast_days)
            .await;

        let mut control = self.control.lock();
        guard.finished = true;
        let generation = guard.generation;
        if control.in_flight == Some(generation) {
            control.in_flight = None;
        }
        if generation != control.generation {
            tracing::debug!(
                "Discarding response for {} (generation {} < {})",
                location.name,
                generation,
                control.generation
            );
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(snapshot) => {
                let advisories = derive_advisories(&snapshot, &self.settings.thresholds);
                tracing::info!(
                    "Forecast ready for {} with {} advisories",
                    snapshot.location_name,
                    advisories.len()
                );
                self.state_tx.send_modify(|state| {
                    state.forecast = Some(Arc::new(snapshot));
                    state.advisories = advisories;
                    state.status = Status::Ready;
                    state.last_error = None;
                });
            }
            Err(e) => {
                tracing::warn!("Forecast fetch for {} failed: {}", location.name, e);
                // Keep whatever forecast we had
                self.state_tx.send_modify(|state| {
                    state.status = Status::Error;
                    state.last_error = Some(e);
                });
            }
        }
        FetchOutcome::Applied
    }

    pub fn set_language(&self, language: Language) {
        self.state_tx.send_modify(|state| state.language = language);
        if let Err(e) = self.prefs.save_language(language) {
            tracing::warn!("Language preference not saved: {}", e);
        }
    }

    /// Star or unstar the active location. Returns whether it is now a favorite.
    pub fn toggle_favorite(&self) -> bool {
        let place = self.state_tx.borrow().active_location.clone();
        if self.locations.is_favorite(&place.name) {
            self.locations.remove_favorite(&place.name);
            false
        } else {
            self.locations.add_favorite(&place);
            true
        }
    }

    /// Districts near the active location.
    pub fn nearby(&self, count: usize) -> Vec<Place> {
        let state = self.state_tx.borrow();
        nearby_districts(
            state.active_location.latitude,
            state.active_location.longitude,
            count,
        )
    }

    /// Feed a keystroke's worth of search text.
    ///
    /// The search runs only if no newer input arrives within the debounce
    /// window, and its results are published only if it is still the latest
    /// query when they come back.
    pub fn on_search_input(self: &Arc<Self>, text: impl Into<String>) -> JoinHandle<()> {
        let text = text.into();
        let seq = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let controller = Arc::clone(self);

        tokio::spawn(async move {
            tokio::time::sleep(controller.settings.search_debounce).await;
            if controller.search_seq.load(Ordering::SeqCst) != seq {
                return;
            }

            let candidates: Vec<_> = controller.locations.search(&text).await.collect();

            let published = controller.search_tx.send_if_modified(|current| {
                let latest = controller.search_seq.load(Ordering::SeqCst);
                if seq != latest || seq <= current.seq {
                    return false;
                }
                *current = SearchResults {
                    seq,
                    query: text.clone(),
                    candidates,
                };
                true
            });
            if !published {
                tracing::debug!("Dropping results for superseded query '{}'", text);
            }
        })
    }

    /// Refresh on a fixed interval until the controller is dropped.
    ///
    /// Returns `None` when auto-refresh is disabled (zero interval).
    pub fn spawn_auto_refresh(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let period = self.settings.refresh_interval;
        if period.is_zero() {
            return None;
        }
        let weak: Weak<Self> = Arc::downgrade(self);

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(controller) = weak.upgrade() else {
                    break;
                };
                let outcome = controller.refresh().await;
                tracing::debug!("Auto-refresh: {:?}", outcome);
            }
            tracing::debug!("Auto-refresh stopped");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::LocationSearch;
    use crate::normalize::normalize_forecast;
    use crate::normalize::tests::provider_document;
    use crate::storage::PreferenceStore;
    use crate::types::LocationQuery;
    use async_trait::async_trait;
    use kisan_core::DefaultLocation;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    type Scripted = (Duration, Result<ForecastSnapshot, FetchError>);

    /// Forecast source that plays back canned responses in call order
    struct ScriptedSource {
        script: Mutex<VecDeque<Scripted>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ForecastSource for ScriptedSource {
        async fn fetch_forecast(
            &self,
            _query: &LocationQuery,
            _days: u8,
        ) -> Result<ForecastSnapshot, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().pop_front();
            let (delay, result) = next.unwrap_or((
                Duration::ZERO,
                Err(FetchError::MalformedResponse("script exhausted".into())),
            ));
            tokio::time::sleep(delay).await;
            result
        }
    }

    /// Geocoder that echoes the query back, slowly for one chosen query
    struct EchoGeocoder {
        slow_query: &'static str,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LocationSearch for EchoGeocoder {
        async fn search(&self, query: &str) -> Result<Vec<LocationCandidate>, FetchError> {
            self.queries.lock().push(query.to_string());
            if query == self.slow_query {
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Ok(vec![LocationCandidate {
                name: query.to_string(),
                latitude: 21.0,
                longitude: 79.0,
                admin1: None,
                country: Some("India".into()),
            }])
        }
    }

    fn snapshot(name: &str) -> ForecastSnapshot {
        let mut snapshot = normalize_forecast(provider_document(), 3).unwrap();
        snapshot.location_name = name.to_string();
        snapshot
    }

    fn ok(delay_ms: u64, name: &str) -> Scripted {
        (Duration::from_millis(delay_ms), Ok(snapshot(name)))
    }

    fn build(
        source: Arc<ScriptedSource>,
        dir: &TempDir,
        settings: DashboardSettings,
        geocoder: Option<Arc<dyn LocationSearch>>,
    ) -> Arc<DashboardController> {
        let store = Arc::new(PreferenceStore::open(dir.path()));
        let prefs = Preferences::new(Arc::clone(&store));
        let mut locations = LocationStore::load(store);
        if let Some(geocoder) = geocoder {
            locations = locations.with_geocoder(geocoder);
        }
        Arc::new(DashboardController::new(
            source,
            Arc::new(locations),
            prefs,
            settings,
        ))
    }

    fn controller(source: Arc<ScriptedSource>, dir: &TempDir) -> Arc<DashboardController> {
        build(source, dir, DashboardSettings::default(), None)
    }

    fn pune() -> Place {
        Place::new("Pune", 18.5204, 73.8567)
    }

    #[tokio::test]
    async fn test_starts_idle_at_default_location() {
        let dir = TempDir::new().unwrap();
        let c = controller(ScriptedSource::new(vec![]), &dir);

        let state = c.state();
        assert_eq!(state.status, Status::Idle);
        assert_eq!(state.active_location.name, "Delhi");
        assert_eq!(state.language, Language::En);
        assert!(state.forecast.is_none());
    }

    #[tokio::test]
    async fn test_mount_loads_forecast_and_advisories() {
        let dir = TempDir::new().unwrap();
        let c = controller(ScriptedSource::new(vec![ok(0, "Delhi")]), &dir);

        assert_eq!(c.mount().await, FetchOutcome::Applied);

        let state = c.state();
        assert_eq!(state.status, Status::Ready);
        assert_eq!(state.forecast.as_ref().unwrap().location_name, "Delhi");
        assert_eq!(
            state.advisories,
            BTreeSet::from([AdvisoryFlag::IrrigationRecommended, AdvisoryFlag::PestRiskHigh])
        );
        assert!(state.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_fetch_is_discarded() {
        let dir = TempDir::new().unwrap();
        let source = ScriptedSource::new(vec![ok(500, "Delhi"), ok(10, "Pune")]);
        let c = controller(source, &dir);

        let first = tokio::spawn({
            let c = Arc::clone(&c);
            async move { c.mount().await }
        });
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(c.select_location(pune()).await, FetchOutcome::Applied);
        assert_eq!(first.await.unwrap(), FetchOutcome::Discarded);

        let state = c.state();
        assert_eq!(state.status, Status::Ready);
        assert_eq!(state.active_location.name, "Pune");
        assert_eq!(state.forecast.unwrap().location_name, "Pune");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_while_loading_is_coalesced() {
        let dir = TempDir::new().unwrap();
        let source = ScriptedSource::new(vec![ok(200, "Delhi"), ok(0, "Delhi")]);
        let c = controller(Arc::clone(&source), &dir);

        let first = tokio::spawn({
            let c = Arc::clone(&c);
            async move { c.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(c.state().status, Status::Loading);
        assert_eq!(c.refresh().await, FetchOutcome::Coalesced);
        let delhi = Place::from(&DefaultLocation::default());
        assert_eq!(c.select_location(delhi).await, FetchOutcome::Coalesced);
        assert_eq!(first.await.unwrap(), FetchOutcome::Applied);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_fetch_releases_loading() {
        let dir = TempDir::new().unwrap();
        let source = ScriptedSource::new(vec![ok(500, "Delhi"), ok(0, "Delhi")]);
        let c = controller(Arc::clone(&source), &dir);

        let pending = tokio::spawn({
            let c = Arc::clone(&c);
            async move { c.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(c.state().status, Status::Loading);

        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert_eq!(c.state().status, Status::Idle);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(c.refresh().await, FetchOutcome::Applied);
        assert_eq!(c.state().status, Status::Ready);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_refresh_keeps_ready_state() {
        let dir = TempDir::new().unwrap();
        let source = ScriptedSource::new(vec![
            ok(0, "Delhi"),
            ok(1_000, "Delhi"),
            ok(0, "Delhi"),
        ]);
        let c = controller(source, &dir);
        c.mount().await;
        let before = c.state();

        let timed_out = tokio::time::timeout(Duration::from_millis(100), c.refresh()).await;
        assert!(timed_out.is_err());

        let after = c.state();
        assert_eq!(after.status, Status::Ready);
        assert_eq!(after.forecast, before.forecast);
        assert_eq!(c.refresh().await, FetchOutcome::Applied);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reselecting_active_location_keeps_forecast() {
        let dir = TempDir::new().unwrap();
        let source = ScriptedSource::new(vec![ok(0, "Delhi"), ok(100, "Delhi")]);
        let c = controller(Arc::clone(&source), &dir);
        c.mount().await;

        let pending = tokio::spawn({
            let c = Arc::clone(&c);
            async move {
                c.select_location(Place::from(&DefaultLocation::default()))
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(1)).await;

        let loading = c.state();
        assert_eq!(loading.status, Status::Loading);
        assert!(loading.forecast.is_some());
        assert!(!loading.advisories.is_empty());

        assert_eq!(pending.await.unwrap(), FetchOutcome::Applied);
        assert_eq!(c.state().status, Status::Ready);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_credentials_keeps_forecast() {
        let dir = TempDir::new().unwrap();
        let source = ScriptedSource::new(vec![
            ok(0, "Delhi"),
            (Duration::ZERO, Err(FetchError::MissingCredentials)),
        ]);
        let c = controller(source, &dir);

        c.mount().await;
        let before = c.state();
        assert_eq!(before.status, Status::Ready);

        assert_eq!(c.refresh().await, FetchOutcome::Applied);

        let after = c.state();
        assert_eq!(after.status, Status::Error);
        assert_eq!(after.last_error, Some(FetchError::MissingCredentials));
        assert_eq!(after.forecast, before.forecast);
        assert_eq!(after.advisories, before.advisories);
        assert!(after.error_message().is_some());
    }

    #[tokio::test]
    async fn test_recovery_clears_error() {
        let dir = TempDir::new().unwrap();
        let source = ScriptedSource::new(vec![
            (
                Duration::ZERO,
                Err(FetchError::UpstreamUnavailable {
                    status: Some(503),
                    message: "down".into(),
                }),
            ),
            ok(0, "Delhi"),
        ]);
        let c = controller(source, &dir);

        c.mount().await;
        assert_eq!(c.state().status, Status::Error);
        assert!(c.state().forecast.is_none());

        c.refresh().await;
        let state = c.state();
        assert_eq!(state.status, Status::Ready);
        assert!(state.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_change_drops_old_advisories() {
        let dir = TempDir::new().unwrap();
        let source = ScriptedSource::new(vec![
            ok(0, "Delhi"),
            (
                Duration::from_millis(100),
                Err(FetchError::UpstreamUnavailable {
                    status: None,
                    message: "timeout".into(),
                }),
            ),
        ]);
        let c = controller(source, &dir);
        c.mount().await;
        assert!(!c.state().advisories.is_empty());

        let pending = tokio::spawn({
            let c = Arc::clone(&c);
            async move { c.select_location(pune()).await }
        });
        tokio::time::sleep(Duration::from_millis(1)).await;

        let loading = c.state();
        assert_eq!(loading.status, Status::Loading);
        assert!(loading.forecast.is_none());
        assert!(loading.advisories.is_empty());

        assert_eq!(pending.await.unwrap(), FetchOutcome::Applied);
        let state = c.state();
        assert_eq!(state.status, Status::Error);
        assert!(state.forecast.is_none());
        assert!(state.advisories.is_empty());
    }

    #[tokio::test]
    async fn test_last_location_restored() {
        let dir = TempDir::new().unwrap();
        let c = controller(ScriptedSource::new(vec![ok(0, "Pune")]), &dir);
        c.select_location(pune()).await;
        drop(c);

        let c = controller(ScriptedSource::new(vec![]), &dir);
        assert_eq!(c.state().active_location, pune());
    }

    #[tokio::test]
    async fn test_language_persists() {
        let dir = TempDir::new().unwrap();
        let c = controller(ScriptedSource::new(vec![]), &dir);

        let mut rx = c.subscribe();
        c.set_language(Language::Hi);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().language, Language::Hi);

        let c = controller(ScriptedSource::new(vec![]), &dir);
        assert_eq!(c.state().language, Language::Hi);
    }

    #[tokio::test]
    async fn test_toggle_favorite_and_nearby() {
        let dir = TempDir::new().unwrap();
        let c = controller(ScriptedSource::new(vec![]), &dir);

        assert!(c.toggle_favorite());
        assert!(c.locations().is_favorite("delhi"));
        assert!(!c.toggle_favorite());
        assert!(c.locations().list_favorites().is_empty());

        let nearby = c.nearby(2);
        assert_eq!(nearby.len(), 2);
        assert_eq!(nearby[0].name, "Jaipur");
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_input_is_debounced() {
        let dir = TempDir::new().unwrap();
        let geocoder = Arc::new(EchoGeocoder {
            slow_query: "",
            queries: Mutex::new(Vec::new()),
        });
        let c = build(
            ScriptedSource::new(vec![]),
            &dir,
            DashboardSettings::default(),
            Some(geocoder.clone()),
        );

        let mut handles = Vec::new();
        for text in ["Na", "Nag", "Nagp"] {
            handles.push(c.on_search_input(text));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*geocoder.queries.lock(), vec!["Nagp".to_string()]);
        let results = c.search_results().borrow().clone();
        assert_eq!(results.query, "Nagp");
        assert_eq!(results.candidates.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_search_results_are_dropped() {
        let dir = TempDir::new().unwrap();
        let geocoder = Arc::new(EchoGeocoder {
            slow_query: "Nashik",
            queries: Mutex::new(Vec::new()),
        });
        let c = build(
            ScriptedSource::new(vec![]),
            &dir,
            DashboardSettings::default(),
            Some(geocoder.clone()),
        );

        let slow = c.on_search_input("Nashik");
        // Past the debounce window: the slow search is already running
        tokio::time::sleep(Duration::from_millis(400)).await;
        let fast = c.on_search_input("Nagpur");

        fast.await.unwrap();
        slow.await.unwrap();

        assert_eq!(geocoder.queries.lock().len(), 2);
        assert_eq!(c.search_results().borrow().query, "Nagpur");
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_refresh_ticks() {
        let dir = TempDir::new().unwrap();
        let source = ScriptedSource::new(vec![ok(0, "Delhi"), ok(0, "Delhi"), ok(0, "Delhi")]);
        let settings = DashboardSettings {
            refresh_interval: Duration::from_secs(60),
            ..DashboardSettings::default()
        };
        let c = build(Arc::clone(&source), &dir, settings, None);

        c.mount().await;
        let handle = c.spawn_auto_refresh().unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(source.calls(), 2);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 3);

        handle.abort();
    }

    #[tokio::test]
    async fn test_auto_refresh_disabled_at_zero() {
        let dir = TempDir::new().unwrap();
        let settings = DashboardSettings {
            refresh_interval: Duration::ZERO,
            ..DashboardSettings::default()
        };
        let c = build(ScriptedSource::new(vec![]), &dir, settings, None);

        assert!(c.spawn_auto_refresh().is_none());
    }
}
