//! Cache module for the latest comics response
//!
//! This module provides a single-slot, in-memory cache in front of a
//! `ComicsSource`. A response with code 200 is served until the process
//! exits; anything else is refetched on the next read.

mod store;

pub use store::{CacheSlot, CacheState, ComicsCache};
