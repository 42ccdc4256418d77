//! Deterministic random number generation.
//!
//! Every random decision in a game (enemy element, per-round bonuses, enemy
//! target and attack strength) is drawn from a seeded [`GameRng`], so a game replays
//! identically from the same seed and the same player inputs.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Generate a random value in range [min, max] inclusive.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32(seed) % range)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG is a family of simple, fast, space-efficient RNGs with excellent
/// statistical quality. This implementation uses PCG-XSH-RR, which produces
/// 32-bit output from 64-bit state.
///
/// # Properties
///
/// - **Deterministic**: Same seed always produces same output
/// - **Fast**: Single multiply + xorshift + rotate
/// - **Small state**: Only 64 bits
/// - **Good quality**: Passes statistical tests (PractRand, TestU01)
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Advance the PCG state by one step.
    ///
    /// Uses LCG (Linear Congruential Generator) formula:
    /// `state' = (state * multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    ///
    /// This is where the "permutation" happens - transforms the LCG state
    /// into high-quality random output.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        // XOR upper bits with lower bits, shift right
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;

        // Use upper bits to determine rotation amount
        let rot = (state >> 59) as u32;

        // Random rotation provides the final permutation
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Mixes the game seed with a draw counter and a draw purpose.
///
/// `context` separates independent streams drawn at the same nonce, e.g.
/// the enemy element and the first player's bonus at the start of a game.
pub fn compute_seed(game_seed: u64, nonce: u64, context: u32) -> u64 {
    // SplitMix64 / FxHash style multipliers
    let mut hash = game_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (context as u64).wrapping_mul(0x517cc1b727220a95);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Purpose of a random draw, mixed into the seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum RollContext {
    EnemyElement = 0,
    PlayerBonus = 1,
    EnemyStrength = 2,
    EnemyTarget = 3,
}

/// Seeded, stateful random source owned by one game.
///
/// Each draw advances an internal nonce, so consecutive draws differ even
/// with the same context.
#[derive(Clone, Debug)]
pub struct GameRng<R: RngOracle = PcgRng> {
    oracle: R,
    seed: u64,
    nonce: u64,
}

impl GameRng<PcgRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_oracle(PcgRng, seed)
    }
}

impl<R: RngOracle> GameRng<R> {
    pub fn with_oracle(oracle: R, seed: u64) -> Self {
        Self {
            oracle,
            seed,
            nonce: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of values drawn so far.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn next_u32(&mut self, context: RollContext) -> u32 {
        let seed = compute_seed(self.seed, self.nonce, context as u32);
        self.nonce = self.nonce.wrapping_add(1);
        self.oracle.next_u32(seed)
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn index(&mut self, context: RollContext, len: usize) -> usize {
        debug_assert!(len > 0, "index drawn from an empty range");
        self.next_u32(context) as usize % len.max(1)
    }

    /// Picks one element of `items`, `None` when it is empty.
    pub fn pick<'a, T>(&mut self, context: RollContext, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.index(context, items.len());
        items.get(index)
    }
}
