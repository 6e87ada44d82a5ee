//! Tile server access
//!
//! This module provides the HTTP client abstraction used by every stage that
//! touches the network, plus the two tile-level primitives built on it:
//! existence probing and fetch+decode.
//!
//! ```ignore
//! use deepstitch::provider::{tile_exists, AsyncReqwestClient};
//!
//! let client = AsyncReqwestClient::new()?;
//! let present = tile_exists(&client, "https://example.com/img/12/0_0.jpg").await;
//! ```

mod fetch;
mod http;
mod types;

pub use fetch::{decode_tile, fetch_tile, tile_exists, TileFetchError};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use types::ProviderError;

#[cfg(test)]
pub use fetch::tests::{pyramid_level, solid_tile, tile_color};
#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
