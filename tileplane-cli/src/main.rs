//! Tileplane CLI - Command-line interface
//!
//! Projection helpers and a headless driver for the tile plane cache.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use tileplane::provider::ViewType;

use commands::config::ConfigCommands;
use commands::plane::PlaneArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "tileplane")]
#[command(version, about = "Map tile plane cache and Mercator projection tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a latitude/longitude to a pixel on the map canvas
    Project {
        /// Latitude in degrees [-90, 90]
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees [-180, 180]
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        /// Zoom level [1, 23] (defaults to config)
        #[arg(long, short)]
        zoom: Option<u8>,
    },

    /// Convert a pixel on the map canvas back to latitude/longitude
    Unproject {
        /// Pixel X
        x: f64,

        /// Pixel Y
        y: f64,

        /// Zoom level [1, 23] (defaults to config)
        #[arg(long, short)]
        zoom: Option<u8>,
    },

    /// Populate a tile plane once and print the outcome per slot
    Plane {
        /// Center latitude (requires --lon)
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Center longitude (requires --lat)
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Center on a named place instead of coordinates
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        location: Option<String>,

        /// Odd edge length of the plane (defaults to config)
        #[arg(long)]
        grid_size: Option<usize>,

        /// Zoom level [1, 23] (defaults to config)
        #[arg(long, short)]
        zoom: Option<u8>,

        /// Imagery style, e.g. Aerial, Road, CanvasDark (defaults to config)
        #[arg(long)]
        view_type: Option<ViewType>,

        /// Provider API key (overrides config)
        #[arg(long)]
        api_key: Option<String>,

        /// Use generated tiles instead of the network
        #[arg(long)]
        offline: bool,
    },

    /// View or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Project { lat, lon, zoom } => commands::project::run_project(lat, lon, zoom),
        Commands::Unproject { x, y, zoom } => commands::project::run_unproject(x, y, zoom),
        Commands::Plane {
            lat,
            lon,
            location,
            grid_size,
            zoom,
            view_type,
            api_key,
            offline,
        } => commands::plane::run(PlaneArgs {
            lat,
            lon,
            location,
            grid_size,
            zoom,
            view_type,
            api_key,
            offline,
        }),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        exit_with_error(e);
    }
}

fn exit_with_error(e: CliError) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}
