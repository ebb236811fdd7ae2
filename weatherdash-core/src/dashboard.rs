//! The dashboard controller.
//!
//! `Dashboard` owns all mutable state and is driven from a single task:
//! user commands, scheduler ticks, fetch completions and the banner timer are
//! all applied here, one at a time. Fetches run as spawned tasks and report
//! back over a channel, so the countdown never waits on the network.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, sleep_until},
};

use crate::{
    config::{Config, StaleFetchPolicy},
    error::{FavoritesError, FetchError, GeolocationError},
    favorites::FavoritesRegistry,
    location::GeolocationProvider,
    model::WeatherSnapshot,
    presenter::Presenter,
    provider::ForecastClient,
    region::{BuiltinRegions, RegionNames},
    scheduler::{PAUSED_TEXT, RefreshScheduler, Tick, TickOutcome, countdown_text},
    storage::KeyValueStore,
    store::WeatherSnapshotStore,
    units::DisplayUnit,
    view::WeatherView,
};

/// How long the "favorites full" banner stays up.
pub const BANNER_DURATION: Duration = Duration::from_secs(4);

pub const FAVORITES_FULL_MESSAGE: &str = "You can only keep 5 favorite cities.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    UseLocation,
    ToggleUnit,
    SetAutoRefresh(bool),
    /// Add the city of the displayed snapshot.
    AddFavorite,
    SelectFavorite(usize),
    RemoveFavorite(usize),
    ShowStatus,
    Quit,
}

/// A command plus an optional acknowledgement, sent once it has been handled.
#[derive(Debug)]
pub struct Submission {
    pub command: Command,
    pub handled: Option<oneshot::Sender<()>>,
}

impl Submission {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            handled: None,
        }
    }

    pub fn with_ack(command: Command) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let submission = Self {
            command,
            handled: Some(tx),
        };
        (submission, rx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub initial_city: Option<String>,
    pub auto_refresh: bool,
    pub stale_fetches: StaleFetchPolicy,
    pub unit: DisplayUnit,
}

impl DashboardOptions {
    pub fn from_config(config: &Config) -> Self {
        let city = config.default_city.trim();
        Self {
            initial_city: (!city.is_empty()).then(|| city.to_string()),
            auto_refresh: config.auto_refresh,
            stale_fetches: config.stale_fetches,
            unit: DisplayUnit::default(),
        }
    }
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything the dashboard mutates.
#[derive(Debug)]
pub struct AppState<S> {
    pub store: WeatherSnapshotStore,
    pub favorites: FavoritesRegistry<S>,
    pub scheduler: RefreshScheduler,
}

#[derive(Debug, Clone)]
enum FetchTarget {
    City(String),
    CurrentLocation,
}

#[derive(Debug)]
enum RefreshFailure {
    Fetch(FetchError),
    Location(GeolocationError),
}

#[derive(Debug)]
struct FetchCompletion {
    seq: u64,
    result: Result<WeatherSnapshot, RefreshFailure>,
}

#[derive(Debug)]
enum FetchUpdate {
    /// The position is known and the forecast request is going out.
    Located,
    Completed(FetchCompletion),
}

#[derive(Debug)]
enum Wake {
    Tick(Tick),
    Located,
    Fetched(FetchCompletion),
    BannerExpired,
}

enum Next {
    Submission(Option<Submission>),
    Wake(Wake),
}

pub struct Dashboard<S, P> {
    state: AppState<S>,
    client: Arc<dyn ForecastClient>,
    geolocation: Arc<dyn GeolocationProvider>,
    regions: Box<dyn RegionNames + Send + Sync>,
    presenter: P,
    stale_fetches: StaleFetchPolicy,
    next_seq: u64,
    last_applied: Option<u64>,
    in_flight: usize,
    banner_deadline: Option<Instant>,
    ticks: mpsc::UnboundedReceiver<Tick>,
    fetch_tx: mpsc::UnboundedSender<FetchUpdate>,
    fetch_rx: mpsc::UnboundedReceiver<FetchUpdate>,
}

impl<S: KeyValueStore, P: Presenter> Dashboard<S, P> {
    pub fn new(
        client: Arc<dyn ForecastClient>,
        geolocation: Arc<dyn GeolocationProvider>,
        favorites: FavoritesRegistry<S>,
        presenter: P,
        stale_fetches: StaleFetchPolicy,
    ) -> Self {
        let (tick_tx, ticks) = mpsc::unbounded_channel();
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();

        Self {
            state: AppState {
                store: WeatherSnapshotStore::new(),
                favorites,
                scheduler: RefreshScheduler::new(tick_tx),
            },
            client,
            geolocation,
            regions: Box::new(BuiltinRegions),
            presenter,
            stale_fetches,
            next_seq: 0,
            last_applied: None,
            in_flight: 0,
            banner_deadline: None,
            ticks,
            fetch_tx,
            fetch_rx,
        }
    }

    pub fn with_regions(mut self, regions: impl RegionNames + Send + Sync + 'static) -> Self {
        self.regions = Box::new(regions);
        self
    }

    pub fn state(&self) -> &AppState<S> {
        &self.state
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Initial render, first fetch, and auto-refresh if enabled.
    pub fn open(&mut self, options: &DashboardOptions) {
        self.state.store.set_unit(options.unit);
        self.presenter.render_favorites(self.state.favorites.list());

        if let Some(city) = options.initial_city.as_deref() {
            self.handle(Command::Search(city.to_string()));
        }

        self.handle(Command::SetAutoRefresh(options.auto_refresh));
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        tracing::debug!(?command, "handling command");

        match command {
            Command::Search(city) => {
                let city = city.trim();
                if !city.is_empty() {
                    self.spawn_fetch(FetchTarget::City(city.to_string()));
                }
            }
            Command::UseLocation => self.spawn_fetch(FetchTarget::CurrentLocation),
            Command::ToggleUnit => {
                if self.state.store.current().is_some() {
                    let unit = self.state.store.toggle_unit();
                    tracing::debug!(?unit, "display unit changed");
                    self.render_current();
                }
            }
            Command::SetAutoRefresh(true) => self.state.scheduler.start(),
            Command::SetAutoRefresh(false) => {
                self.state.scheduler.stop();
                self.presenter.render_countdown(PAUSED_TEXT);
            }
            Command::AddFavorite => self.add_current_to_favorites(),
            Command::SelectFavorite(index) => match self.state.favorites.get(index) {
                Some(city) => {
                    let city = city.to_string();
                    self.spawn_fetch(FetchTarget::City(city));
                }
                None => tracing::debug!(index, "no favorite at position"),
            },
            Command::RemoveFavorite(index) => self.remove_favorite(index),
            Command::ShowStatus => {
                self.render_current();
                self.presenter.render_favorites(self.state.favorites.list());
                self.presenter.render_status(&self.state.scheduler.state());
            }
            Command::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    /// Wait for the next tick, fetch completion or banner expiry and apply it.
    pub async fn step(&mut self) {
        let wake = self.wake().await;
        self.apply(wake);
    }

    /// Event loop. Returns when `submissions` closes or a `Quit` arrives.
    pub async fn run(&mut self, mut submissions: mpsc::UnboundedReceiver<Submission>) {
        loop {
            let next = tokio::select! {
                submission = submissions.recv() => Next::Submission(submission),
                wake = self.wake() => Next::Wake(wake),
            };

            match next {
                Next::Submission(Some(Submission { command, handled })) => {
                    let flow = self.handle(command);
                    if let Some(ack) = handled {
                        let _ = ack.send(());
                    }
                    if flow == Flow::Quit {
                        break;
                    }
                }
                Next::Submission(None) => break,
                Next::Wake(wake) => self.apply(wake),
            }
        }

        self.state.scheduler.stop();
        tracing::info!("dashboard closed");
    }

    async fn wake(&mut self) -> Wake {
        let banner = self.banner_deadline;

        tokio::select! {
            Some(tick) = self.ticks.recv() => Wake::Tick(tick),
            Some(update) = self.fetch_rx.recv() => match update {
                FetchUpdate::Located => Wake::Located,
                FetchUpdate::Completed(done) => Wake::Fetched(done),
            },
            () = sleep_until(banner.unwrap_or_else(Instant::now)), if banner.is_some() => {
                Wake::BannerExpired
            }
        }
    }

    fn apply(&mut self, wake: Wake) {
        match wake {
            Wake::Tick(tick) => self.on_tick(tick),
            Wake::Located => self.begin_loading(),
            Wake::Fetched(done) => self.on_fetch_completed(done),
            Wake::BannerExpired => {
                self.banner_deadline = None;
                self.presenter.hide_favorites_banner();
            }
        }
    }

    fn on_tick(&mut self, tick: Tick) {
        match self.state.scheduler.on_tick(tick) {
            TickOutcome::Stale => {}
            TickOutcome::Counting { shown } => {
                self.presenter.render_countdown(&countdown_text(shown));
            }
            TickOutcome::RefreshDue => {
                self.presenter.render_countdown(&countdown_text(0));
                self.auto_refresh();
            }
        }
    }

    fn auto_refresh(&mut self) {
        let Some(snapshot) = self.state.store.current() else {
            tracing::debug!("auto-refresh skipped, nothing fetched yet");
            return;
        };

        match snapshot.city() {
            Some(city) => {
                let city = city.to_string();
                self.spawn_fetch(FetchTarget::City(city));
            }
            None => {
                // The snapshot came from a coordinate lookup without a city
                // name, so the refresh switches to the location source.
                tracing::info!("auto-refresh has no city name, using current location");
                self.spawn_fetch(FetchTarget::CurrentLocation);
            }
        }
    }

    fn spawn_fetch(&mut self, target: FetchTarget) {
        let seq = self.next_seq;
        self.next_seq += 1;

        // A location lookup may be refused, so loading starts once it resolves.
        if let FetchTarget::City(_) = target {
            self.begin_loading();
        }

        tracing::debug!(seq, source = ?target, "starting fetch");

        let client = Arc::clone(&self.client);
        let geolocation = Arc::clone(&self.geolocation);
        let tx = self.fetch_tx.clone();

        tokio::spawn(async move {
            let result = match target {
                FetchTarget::City(city) => client
                    .fetch_by_city(&city)
                    .await
                    .map_err(RefreshFailure::Fetch),
                FetchTarget::CurrentLocation => match geolocation.current_position().await {
                    Ok(coords) => {
                        let _ = tx.send(FetchUpdate::Located);
                        client
                            .fetch_by_coordinates(coords)
                            .await
                            .map_err(RefreshFailure::Fetch)
                    }
                    Err(e) => Err(RefreshFailure::Location(e)),
                },
            };

            // receiver lives as long as the dashboard
            let _ = tx.send(FetchUpdate::Completed(FetchCompletion { seq, result }));
        });
    }

    fn begin_loading(&mut self) {
        self.in_flight += 1;
        self.presenter.show_loading();
    }

    fn on_fetch_completed(&mut self, done: FetchCompletion) {
        let loading = !matches!(done.result, Err(RefreshFailure::Location(_)));
        if loading {
            self.in_flight = self.in_flight.saturating_sub(1);
        }

        let superseded = self.stale_fetches == StaleFetchPolicy::LatestRequest
            && self.last_applied.is_some_and(|last| done.seq < last);

        if superseded {
            tracing::debug!(seq = done.seq, "discarding superseded fetch result");
        } else {
            match done.result {
                Ok(snapshot) => {
                    tracing::info!(seq = done.seq, city = %snapshot.location_name, "forecast updated");
                    self.last_applied = Some(done.seq);
                    self.state.store.replace(snapshot);
                    self.render_current();
                }
                Err(RefreshFailure::Fetch(e)) => {
                    tracing::debug!(seq = done.seq, "fetch failed: {e}");
                    self.last_applied = Some(done.seq);
                    self.presenter.show_fetch_error();
                }
                Err(RefreshFailure::Location(e)) => {
                    tracing::debug!(seq = done.seq, "location unavailable: {e}");
                    self.presenter.alert(&e.to_string());
                    self.render_current();
                }
            }
        }

        if loading && self.in_flight == 0 {
            self.presenter.hide_loading();
        }
    }

    fn render_current(&mut self) {
        if let Some(snapshot) = self.state.store.current() {
            let view = WeatherView::new(snapshot, self.state.store.unit(), self.regions.as_ref());
            self.presenter.render_weather(&view);
        }
    }

    fn add_current_to_favorites(&mut self) {
        let Some(city) = self.state.store.current().and_then(|s| s.city()) else {
            return;
        };
        let city = city.to_string();

        match self.state.favorites.add(city) {
            Ok(()) => self.presenter.render_favorites(self.state.favorites.list()),
            Err(FavoritesError::DuplicateCity(city)) => {
                tracing::debug!(%city, "already a favorite");
            }
            Err(FavoritesError::CapacityExceeded { .. }) => {
                self.presenter.show_favorites_banner(FAVORITES_FULL_MESSAGE);
                self.banner_deadline = Some(Instant::now() + BANNER_DURATION);
            }
            Err(e) => {
                tracing::warn!("failed to save favorites: {e}");
                self.presenter.alert(&e.to_string());
            }
        }
    }

    fn remove_favorite(&mut self, index: usize) {
        let presenter = &mut self.presenter;
        let removed = self.state.favorites.remove(index, |city| {
            presenter.confirm(&format!("Remove {city} from favorites?"))
        });

        match removed {
            Ok(Some(city)) => {
                tracing::info!(%city, "favorite removed");
                self.presenter.render_favorites(self.state.favorites.list());
            }
            Ok(None) => {}
            Err(FavoritesError::IndexOutOfRange(index)) => {
                tracing::debug!(index, "no favorite at position");
            }
            Err(e) => {
                tracing::warn!("failed to save favorites: {e}");
                self.presenter.alert(&e.to_string());
            }
        }
    }
}
