//! comicshelf library
//!
//! Signed access to the Marvel `/comics` endpoint and a single-slot cache
//! that serves the latest successful response.

pub mod cache;
pub mod cli;
pub mod data;

pub use cache::{CacheState, ComicsCache};
pub use data::{ClientConfig, ComicsClient, ComicsError, ComicsResponse, ComicsSource, Credentials};
