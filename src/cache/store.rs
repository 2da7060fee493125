//! In-memory slot for the latest comics response
//!
//! Provides a `ComicsCache` that serves the last successful response and
//! only goes to the network when the slot is empty or holds a failure code.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;

use crate::data::{ComicsError, ComicsResponse, ComicsSource};

/// Value held by the cache slot
pub type CacheSlot = Option<Arc<ComicsResponse>>;

type InFlight = Shared<BoxFuture<'static, Result<Arc<ComicsResponse>, ComicsError>>>;

/// Observable state of the cache slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing has been fetched yet
    Empty,
    /// Holds a response with code 200; reads are served from memory
    Valid,
    /// Holds a response with any other code; the next read refetches
    Invalid,
}

/// Memoizes the most recent comics response
///
/// The slot is overwritten wholesale after every completed fetch, even when
/// the new response carries a non-200 code. A failed fetch leaves it
/// untouched. Once a 200 response is stored it is served until the cache is
/// dropped; there is no expiry.
///
/// Concurrent calls to [`retrieve`](Self::retrieve) made while a fetch is
/// outstanding wait on that same fetch instead of issuing their own.
pub struct ComicsCache<S> {
    source: Arc<S>,
    slot: Arc<watch::Sender<CacheSlot>>,
    in_flight: Mutex<Option<InFlight>>,
}

impl<S: ComicsSource + 'static> ComicsCache<S> {
    /// Creates an empty cache that fetches through `source`
    pub fn new(source: S) -> Self {
        Self::from_arc(Arc::new(source))
    }

    /// Creates an empty cache around a shared source
    pub fn from_arc(source: Arc<S>) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            source,
            slot: Arc::new(slot),
            in_flight: Mutex::new(None),
        }
    }

    /// Returns the cached response, fetching a fresh one if the slot is not valid
    ///
    /// The returned value is a snapshot: later fetches replace the slot but
    /// do not change what an earlier caller holds. Use
    /// [`subscribe`](Self::subscribe) to follow updates.
    ///
    /// # Returns
    /// * `Ok(response)` from memory when the slot holds a 200 response
    /// * `Ok(response)` from the network otherwise, whatever its code
    /// * `Err(ComicsError)` if the fetch fails; the slot is left as it was
    pub async fn retrieve(&self) -> Result<Arc<ComicsResponse>, ComicsError> {
        let flight = {
            let mut in_flight = self.lock_in_flight();

            if let Some(cached) = valid(&self.slot.borrow()) {
                tracing::trace!("serving comics from cache");
                return Ok(cached);
            }

            match in_flight.as_ref() {
                Some(flight) => {
                    tracing::debug!("joining in-flight comics fetch");
                    flight.clone()
                }
                None => {
                    let flight = self.start_fetch();
                    *in_flight = Some(flight.clone());
                    flight
                }
            }
        };

        let result = flight.clone().await;

        let mut in_flight = self.lock_in_flight();
        if in_flight.as_ref().is_some_and(|f| f.ptr_eq(&flight)) {
            *in_flight = None;
        }

        result
    }

    /// Current slot contents, without fetching
    pub fn current(&self) -> CacheSlot {
        self.slot.borrow().clone()
    }

    pub fn state(&self) -> CacheState {
        match self.slot.borrow().as_deref() {
            None => CacheState::Empty,
            Some(response) if response.is_success() => CacheState::Valid,
            Some(_) => CacheState::Invalid,
        }
    }

    /// Receiver notified every time the slot is overwritten
    pub fn subscribe(&self) -> watch::Receiver<CacheSlot> {
        self.slot.subscribe()
    }

    fn start_fetch(&self) -> InFlight {
        let source = Arc::clone(&self.source);
        let slot = Arc::clone(&self.slot);

        async move {
            tracing::debug!("cache miss, fetching comics");
            let response = Arc::new(source.fetch_comics().await?);
            slot.send_replace(Some(Arc::clone(&response)));
            Ok::<_, ComicsError>(response)
        }
        .boxed()
        .shared()
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> fmt::Debug for ComicsCache<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComicsCache")
            .field("slot", &*self.slot.borrow())
            .finish_non_exhaustive()
    }
}

/// The slot's response if it may be served without refetching
fn valid(slot: &CacheSlot) -> Option<Arc<ComicsResponse>> {
    slot.as_ref().filter(|r| r.is_success()).cloned()
}
