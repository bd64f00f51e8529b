//! Deezer search client for TuneTrail
//!
//! Secondary image provider: a keyword search that returns at most one
//! best-match image URL per query. No API key required. The metadata cache
//! consults it when Last.fm has no artwork, and it is the only source for
//! artist portraits (Last.fm stopped serving artist images).

mod client;
mod error;

pub use client::{DEFAULT_BASE_URL, DeezerClient};
pub use error::{Error, Result};
