//! Add-location round trips, including the latency/coin-flip simulator used
//! in place of a real backend.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::protocol::{AddLocationRequest, AddLocationResponse};
use tokio::sync::Mutex;
use tracing::debug;

pub const DEFAULT_SUBMIT_LATENCY: Duration = Duration::from_millis(1500);
pub const DEFAULT_SUCCESS_RATE: f64 = 0.8;
pub const SIMULATED_SUCCESS_MESSAGE: &str = "Location added successfully";
pub const SIMULATED_FAILURE_MESSAGE: &str = "Failed to add location (simulated error)";

/// Performs the "add location to chain" call.
///
/// A rejected add is a normal `Ok` response with `success == false`; `Err`
/// is reserved for the call itself breaking.
#[async_trait]
pub trait LocationSubmitter: Send + Sync {
    async fn add_location(&self, request: AddLocationRequest) -> Result<AddLocationResponse>;
}

pub struct SimulatedSubmitter {
    latency: Duration,
    success_rate: f64,
    rng: Mutex<StdRng>,
}

impl Default for SimulatedSubmitter {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMIT_LATENCY, DEFAULT_SUCCESS_RATE)
    }
}

impl SimulatedSubmitter {
    pub fn new(latency: Duration, success_rate: f64) -> Self {
        Self::with_rng(latency, success_rate, StdRng::from_entropy())
    }

    pub fn seeded(latency: Duration, success_rate: f64, seed: u64) -> Self {
        Self::with_rng(latency, success_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(latency: Duration, success_rate: f64, rng: StdRng) -> Self {
        Self {
            latency,
            success_rate: normalize_success_rate(success_rate),
            rng: Mutex::new(rng),
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }
}

pub fn normalize_success_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        DEFAULT_SUCCESS_RATE
    } else {
        rate.clamp(0.0, 1.0)
    }
}

#[async_trait]
impl LocationSubmitter for SimulatedSubmitter {
    async fn add_location(&self, request: AddLocationRequest) -> Result<AddLocationResponse> {
        // Always suspend, even with zero latency, so callers observe the pending state.
        tokio::time::sleep(self.latency).await;

        let success = self.rng.lock().await.gen_bool(self.success_rate);
        debug!(
            chain_id = %request.chain_id,
            location_id = %request.location_id,
            success,
            "simulated add-location round trip"
        );

        Ok(AddLocationResponse {
            success,
            message: if success {
                SIMULATED_SUCCESS_MESSAGE.to_string()
            } else {
                SIMULATED_FAILURE_MESSAGE.to_string()
            },
            location_id: request.location_id,
        })
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
