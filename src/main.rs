use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use kisan_core::Config;
use kisan_weather::{
    display_flags, DashboardController, DashboardSettings, ForecastSource, GeocodingClient,
    HumidityLevel, LocationStore, Place, PreferenceStore, Preferences, ProxyClient, UvLevel,
    WeatherApiClient,
};

const USAGE: &str = "Usage: kisan [serve | dashboard [<place>]]";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    kisan_core::init()?;

    let (config, _) = Config::load_validated()?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None | Some("serve") => kisan_server::serve(&config).await,
        Some("dashboard") => run_dashboard(&config, args.next()).await,
        Some(other) => anyhow::bail!("Unknown command '{}'. {}", other, USAGE),
    }
}

/// Run the dashboard headless, logging every state change until Ctrl-C.
async fn run_dashboard(config: &Config, place: Option<String>) -> Result<()> {
    let timeout = Duration::from_secs(config.weather.timeout_secs);

    let source: Arc<dyn ForecastSource> = match config.weather.proxy_url.as_deref() {
        Some(url) => {
            tracing::info!("Fetching forecasts through proxy {}", url);
            Arc::new(ProxyClient::new(url, timeout).context("Failed to build proxy client")?)
        }
        None => Arc::new(
            WeatherApiClient::new(&config.weather).context("Failed to build weather client")?,
        ),
    };

    let store = Arc::new(PreferenceStore::open(config.preferences_dir()));
    let prefs = Preferences::new(Arc::clone(&store));
    let mut locations = LocationStore::load(store);
    if let Some(url) = config.weather.geocoding_url.as_deref() {
        let geocoder =
            GeocodingClient::new(url, timeout).context("Failed to build geocoding client")?;
        locations = locations.with_geocoder(Arc::new(geocoder));
    }

    let controller = Arc::new(DashboardController::new(
        source,
        Arc::new(locations),
        prefs,
        DashboardSettings::from_config(config),
    ));

    let mut rx = controller.subscribe();
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            let lang = state.language;
            match &state.forecast {
                Some(forecast) => {
                    let current = &forecast.current;
                    let advisories: Vec<_> = display_flags(&state.advisories)
                        .iter()
                        .map(|flag| flag.label(lang))
                        .collect();
                    tracing::info!(
                        "[{:?}] {} {} {:.0}°C, humidity {}% ({}), {}, advisories: {}",
                        state.status,
                        current.condition.icon(current.is_day),
                        forecast.location_name,
                        current.temperature_c,
                        current.humidity_pct,
                        HumidityLevel::classify(current.humidity_pct).label(lang),
                        UvLevel::classify(current.uv_index).label(lang),
                        advisories.join(", ")
                    );
                }
                None => tracing::info!(
                    "[{:?}] {} (no forecast yet)",
                    state.status,
                    state.active_location.name
                ),
            }
            if let Some(message) = state.error_message() {
                tracing::warn!("{}", message);
            }
        }
    });

    match place {
        Some(name) => {
            let candidate = controller
                .locations()
                .search(&name)
                .await
                .next()
                .with_context(|| format!("No location found for '{}'", name))?;
            tracing::info!("Using {}", candidate.display_name());
            controller
                .select_location(Place::new(
                    candidate.display_name(),
                    candidate.latitude,
                    candidate.longitude,
                ))
                .await;
        }
        None => {
            controller.mount().await;
        }
    }

    let nearby: Vec<_> = controller.nearby(3).into_iter().map(|p| p.name).collect();
    tracing::info!("Nearby districts: {}", nearby.join(", "));

    let refresher = controller.spawn_auto_refresh();

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Shutting down");

    if let Some(refresher) = refresher {
        refresher.abort();
    }
    watcher.abort();
    Ok(())
}
