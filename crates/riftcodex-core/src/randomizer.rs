//! Background random pick.
//!
//! At most one pick runs at a time. The caller either polls for the result
//! from a UI loop or awaits it, and each result is handed out exactly once.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type PickHandle = JoinHandle<Option<String>>;

/// Clears the in-flight flag when the pick task ends, however it ends.
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Default)]
pub struct Randomizer {
    seed: Option<u64>,
    picks: AtomicU64,
    /// Set while a pick task is running, whether or not its handle has been taken
    in_flight: Arc<AtomicBool>,
    pending: Mutex<Option<PickHandle>>,
}

impl Randomizer {
    /// Picks seeded from system entropy
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic picks: the n-th pick uses `seed + n`
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<PickHandle>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_rng(&self) -> StdRng {
        let n = self.picks.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(n)),
            None => StdRng::from_entropy(),
        }
    }

    /// Start a pick over `population` on the tokio runtime.
    ///
    /// Returns false without doing anything while another pick is still
    /// running. A finished result nobody consumed is discarded.
    pub fn pick_random(&self, population: Vec<String>) -> bool {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Random pick already in flight");
            return false;
        }

        let rng = self.next_rng();
        let guard = InFlight(Arc::clone(&self.in_flight));
        debug!(population = population.len(), "Random pick started");
        *self.pending() = Some(tokio::spawn(async move {
            let _guard = guard;
            choose(population, rng)
        }));
        true
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Take the finished result without blocking.
    ///
    /// `None` while nothing has finished; `Some(None)` for a pick over an
    /// empty population.
    pub fn poll(&self) -> Option<Option<String>> {
        let mut pending = self.pending();
        if !pending.as_ref()?.is_finished() {
            return None;
        }
        let handle = pending.take()?;
        handle.now_or_never().map(join_result)
    }

    /// Await the pending pick and take its result. `None` when nothing was
    /// started or the population was empty.
    pub async fn wait(&self) -> Option<String> {
        let handle = self.pending().take()?;
        join_result(handle.await)
    }
}

fn join_result(result: Result<Option<String>, tokio::task::JoinError>) -> Option<String> {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Random pick task failed");
        None
    })
}

/// Shuffle every index and take the first.
fn choose(population: Vec<String>, mut rng: StdRng) -> Option<String> {
    let mut order: Vec<usize> = (0..population.len()).collect();
    order.shuffle(&mut rng);
    let winner = *order.first()?;
    population.into_iter().nth(winner)
}
