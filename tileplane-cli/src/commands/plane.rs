//! Plane command - run one population pass headless and report the result.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tileplane::config::ConfigFile;
use tileplane::coord::{GeoCoordinate, TileDimensions, ZoomLevel};
use tileplane::plane::{CachePhase, SlotStatus, TilePlaneCache};
use tileplane::provider::{
    AsyncReqwestClient, ImageFetcher, LocationClient, StaticMapFetcher, SyntheticFetcher,
    TileImage, ViewType,
};
use tileplane::viewport::ViewportPanner;
use tracing::info;

use super::common::{resolve_coordinate, resolve_zoom};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Gray shown where a tile could not be loaded.
const FALLBACK_RGBA: [u8; 4] = [96, 96, 96, 255];

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Arguments for the plane command.
pub struct PlaneArgs {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub location: Option<String>,
    pub grid_size: Option<usize>,
    pub zoom: Option<u8>,
    pub view_type: Option<ViewType>,
    pub api_key: Option<String>,
    pub offline: bool,
}

/// Settings after merging CLI flags over the config file.
struct PassSettings {
    grid_size: usize,
    zoom: ZoomLevel,
    view_type: ViewType,
    tile_dimensions: TileDimensions,
}

/// Run the plane command.
pub fn run(args: PlaneArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("plane");
    let config = runner.config();

    let settings = PassSettings {
        grid_size: args.grid_size.unwrap_or(config.viewer.grid_size),
        zoom: resolve_zoom(args.zoom, config)?,
        view_type: args.view_type.unwrap_or(config.viewer.view_type),
        tile_dimensions: config.viewer.tile_dimensions,
    };
    let explicit_center = resolve_coordinate(args.lat, args.lon)?;
    let api_key = args.api_key.clone().or_else(|| config.provider.api_key.clone());

    let runtime = runner.runtime()?;
    runtime.block_on(async {
        if args.offline {
            if args.location.is_some() {
                return Err(CliError::Config(
                    "--location needs network access and cannot be combined with --offline"
                        .to_string(),
                ));
            }
            let center = explicit_center.unwrap_or(config.viewer.center);
            return run_pass(SyntheticFetcher::new(), center, &settings).await;
        }

        let api_key = api_key.ok_or_else(|| {
            CliError::Config(
                "An API key is required. Set api_key in config.ini, use --api-key, \
                 or run with --offline"
                    .to_string(),
            )
        })?;

        let center = match (&args.location, explicit_center) {
            (Some(query), _) => resolve_location(query, &api_key, config).await?,
            (None, Some(center)) => center,
            (None, None) => config.viewer.center,
        };

        StaticMapFetcher::<AsyncReqwestClient>::check_tile_dimensions(settings.tile_dimensions)?;
        let client = AsyncReqwestClient::with_timeout(config.provider.timeout_secs)?;
        let fetcher = StaticMapFetcher::new(client, api_key)?;
        run_pass(fetcher, center, &settings).await
    })
}

async fn resolve_location(
    query: &str,
    api_key: &str,
    config: &ConfigFile,
) -> Result<GeoCoordinate, CliError> {
    let client = AsyncReqwestClient::with_timeout(config.provider.timeout_secs)?;
    let locations = LocationClient::new(client, api_key)?;
    let location = locations
        .resolve(query)
        .await?
        .ok_or_else(|| CliError::LocationNotFound(query.to_string()))?;

    println!(
        "Resolved '{}' to {} ({})",
        query,
        location.coordinate,
        location.name.as_deref().unwrap_or("unnamed")
    );
    Ok(location.coordinate)
}

async fn run_pass<F>(
    fetcher: F,
    center: GeoCoordinate,
    settings: &PassSettings,
) -> Result<(), CliError>
where
    F: ImageFetcher<Image = TileImage>,
{
    let fetcher_name = fetcher.name().to_string();
    let fallback = TileImage::solid(settings.tile_dimensions, FALLBACK_RGBA);
    let cache = Arc::new(TilePlaneCache::new(
        settings.grid_size,
        settings.tile_dimensions,
        fallback,
        Arc::new(fetcher),
    )?);
    cache.set_zoom_level(settings.zoom.get())?;
    cache.set_view_type(settings.view_type);

    info!(
        fetcher = %fetcher_name,
        center = %center,
        grid_size = settings.grid_size,
        "Running population pass"
    );

    let panner = ViewportPanner::new(Arc::clone(&cache), center);
    let total = (settings.grid_size * settings.grid_size) as u64;

    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} tiles {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    progress.set_message(fetcher_name.clone());

    while cache.phase() != CachePhase::Idle {
        progress.set_position(resolved_slots(&cache));
        tokio::select! {
            _ = cache.wait_until_idle() => {}
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }
    }
    progress.set_position(resolved_slots(&cache));
    progress.finish_and_clear();

    print_report(&cache, &panner, &fetcher_name);
    cache.dispose();
    Ok(())
}

fn resolved_slots<F: ImageFetcher>(cache: &TilePlaneCache<F>) -> u64 {
    cache
        .slot_statuses()
        .iter()
        .flatten()
        .filter(|s| matches!(s, SlotStatus::Fetched | SlotStatus::Fallback))
        .count() as u64
}

fn print_report<F: ImageFetcher>(
    cache: &TilePlaneCache<F>,
    panner: &ViewportPanner<F>,
    fetcher_name: &str,
) {
    println!("Tile plane");
    println!("==========");
    println!();
    println!("  Fetcher:   {}", fetcher_name);
    println!("  Center:    {}", panner.center());
    println!("  Zoom:      {}", cache.zoom_level());
    println!("  View type: {}", cache.view_type());
    println!(
        "  Grid:      {0}x{0} tiles of {1} px",
        cache.grid_size(),
        cache.tile_dimensions()
    );
    println!();

    for row in cache.slot_statuses() {
        let line: String = row
            .iter()
            .map(|s| s.glyph().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        println!("  {}", line);
    }
    println!();
    println!("  # fetched   x fallback   ~ loading   . empty");
    println!();

    let metrics = cache.metrics().snapshot();
    println!("  Passes started:       {}", metrics.passes_started);
    println!("  Passes superseded:    {}", metrics.passes_superseded);
    println!("  Fetches succeeded:    {}", metrics.fetches_succeeded);
    println!("  Fetches failed:       {}", metrics.fetches_failed);
    println!("  Projection fallbacks: {}", metrics.projection_fallbacks);
}
