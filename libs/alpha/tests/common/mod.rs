//! Shared helpers for alpha integration tests

#![allow(dead_code)]

use alpha::{BigDecimal, BigInt};
use num_traits::ToPrimitive;

/// Initialize tracing for tests (safe to call from every test)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

/// Step-by-step alphaX in `f64`, unscaled
pub fn reference_alpha_x(r0_snap: f64, r1_snap: f64, r0_exec: f64, r1_exec: f64) -> f64 {
    let execution_spot = r0_exec / r1_exec;
    let snapshot_spot = r0_snap / r1_snap;
    let delta = (execution_spot / snapshot_spot - 1.0).abs();
    let partial = r0_snap * r1_snap;
    let numerator = partial.sqrt() * r0_snap.sqrt() * (delta * r1_snap + r1_snap).sqrt()
        - r0_snap * r1_snap;
    numerator / r1_snap
}

/// Divide a Q64.64 result by 2^64 and convert to `f64`
pub fn unscale_f64(value: &BigDecimal) -> f64 {
    let q64 = BigDecimal::from(BigInt::from(1u8) << 64usize);
    (value / &q64).to_f64().unwrap()
}
