//! Probability Engine - Stochastic gates for commands and sub-operations
//!
//! Three kinds of randomness drive an EXPLOR run:
//!
//! 1. **Command gates** - [`Probability::fires`] decides whether a command
//!    executes this step, from its period `n` and chance `1/p`.
//! 2. **Events** - [`event`] is the independent "1 in prob" check made per
//!    pixel, per tile and per mutated symbol.
//! 3. **Ranges** - [`range`] picks a CHV operand in `[from, from + |to - from|)`.
//!
//! All draws come from one [`RandomSource`] owned by the interpreter, so a
//! fixed seed reproduces a run exactly.

use crate::error::{ExplorError, Result};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Uniform draws in `[0, 1)`
pub trait RandomSource {
    fn uniform(&mut self) -> f64;
}

/// Default source backed by `StdRng`
pub struct StdSource {
    rng: StdRng,
}

impl StdSource {
    /// Seed from the clock mixed with OS entropy
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let seed = nanos ^ rand::thread_rng().next_u64();
        Self::seeded(seed)
    }

    /// Deterministic source
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdSource {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// "1 in `prob`" event. `prob <= 1` always fires.
pub fn event(rng: &mut dyn RandomSource, prob: i64) -> bool {
    prob <= 1 || rng.uniform() <= 1.0 / prob as f64
}

/// Fair coin, used to resolve twinkle pixels
pub fn coin_flip(rng: &mut dyn RandomSource) -> bool {
    rng.uniform() <= 0.5
}

/// Random integer in `[from, from + |to - from|)`; `from` when the span is empty.
/// The offset wraps like CHV arithmetic.
pub fn range(rng: &mut dyn RandomSource, from: i64, to: i64) -> i64 {
    let span = to.wrapping_sub(from).unsigned_abs() as f64;
    ((rng.uniform() * span).trunc() as i64).wrapping_add(from)
}

/// Execution gate of a command: `(n, p)` with optional negations
///
/// | negate_n | negate_p | tested when        | fires with |
/// |----------|----------|--------------------|------------|
/// | no       | no       | `count % n == 0`   | `1/p`      |
/// | yes      | no       | `count % n != 0`   | `1/p`      |
/// | no       | yes      | `count % n == 0`   | `1 - 1/p`  |
/// | yes      | yes      | `count % n != 0`   | `1 - 1/p`  |
///
/// When the period test fails the command is skipped for this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Probability {
    n: u64,
    p: u64,
    negate_n: bool,
    negate_p: bool,
}

impl Probability {
    /// Gate that always fires
    pub const ALWAYS: Self = Self {
        n: 1,
        p: 1,
        negate_n: false,
        negate_p: false,
    };

    pub fn new(negate_n: bool, n: i64, negate_p: bool, p: i64) -> Result<Self> {
        if n < 1 || p < 1 {
            return Err(ExplorError::InvalidProbability { n, p });
        }
        Ok(Self {
            n: n as u64,
            p: p as u64,
            negate_n,
            negate_p,
        })
    }

    /// Plain `(n, p)`: every `n`th execution, with chance `1/p`
    pub fn every(n: i64, p: i64) -> Result<Self> {
        Self::new(false, n, false, p)
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn p(&self) -> u64 {
        self.p
    }

    pub fn is_always(&self) -> bool {
        *self == Self::ALWAYS
    }

    /// Evaluate the gate against the command's execution counter
    pub fn fires(&self, execution_count: u64, rng: &mut dyn RandomSource) -> bool {
        let on_period = execution_count % self.n == 0;
        if on_period == self.negate_n {
            return false;
        }
        let chance = 1.0 / self.p as f64;
        let threshold = if self.negate_p { 1.0 - chance } else { chance };
        rng.uniform() < threshold
    }
}

impl Default for Probability {
    fn default() -> Self {
        Self::ALWAYS
    }
}
