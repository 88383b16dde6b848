//! Map imagery provider abstraction
//!
//! This module provides the [`ImageFetcher`] trait consumed by the tile
//! plane cache and its implementations:
//!
//! - [`StaticMapFetcher`] - renders one image per tile from a static map
//!   REST endpoint
//! - [`SyntheticFetcher`] - offline solid-color tiles
//!
//! plus [`LocationClient`] for resolving place names to coordinates.
//!
//! ```ignore
//! use tileplane::provider::{AsyncReqwestClient, StaticMapFetcher};
//!
//! let http_client = AsyncReqwestClient::with_timeout(10)?;
//! let fetcher = StaticMapFetcher::new(http_client, api_key)?;
//! ```

mod http;
mod locations;
mod static_map;
mod synthetic;
mod types;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use locations::{parse_locations, Location, LocationClient};
pub use static_map::{StaticMapFetcher, TileImage};
pub use synthetic::SyntheticFetcher;
pub use types::{FetchError, FetchRequest, ImageFetcher, UnknownViewType, ViewType};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
