//! Sources of nondeterminism, made deterministic.
mod rng;

pub use rng::{GameRng, PcgRng, RngOracle, RollContext, compute_seed};
