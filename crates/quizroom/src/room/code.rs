//! Room code generation.
//!
//! Codes are 4-digit numeric strings drawn uniformly from 1000..=9999.
//! Uniqueness against live rooms is enforced by the registry, not here.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Smallest valid room code.
pub const MIN_CODE: u16 = 1000;

/// Largest valid room code.
pub const MAX_CODE: u16 = 9999;

/// Number of distinct room codes.
pub const CODE_SPACE: usize = (MAX_CODE - MIN_CODE + 1) as usize;

/// Source of candidate room codes.
pub trait CodeGenerator: Send {
    /// Produce the next candidate code.
    fn next_code(&mut self) -> String;
}

/// Uniform random codes backed by `StdRng`.
pub struct RandomCodes {
    rng: StdRng,
}

impl RandomCodes {
    /// Seed from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomCodes {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for RandomCodes {
    fn next_code(&mut self) -> String {
        self.rng.random_range(MIN_CODE..=MAX_CODE).to_string()
    }
}

/// Replays a fixed list of codes, then repeats the last one.
///
/// Useful to pin codes in tests and to exercise collision retries.
pub struct FixedCodes {
    codes: VecDeque<String>,
    last: String,
}

impl FixedCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: VecDeque<String> = codes.into_iter().map(Into::into).collect();
        let last = codes
            .back()
            .cloned()
            .unwrap_or_else(|| MIN_CODE.to_string());
        Self { codes, last }
    }
}

impl CodeGenerator for FixedCodes {
    fn next_code(&mut self) -> String {
        self.codes.pop_front().unwrap_or_else(|| self.last.clone())
    }
}

/// Whether `code` has the shape of a room code.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == 4
        && code
            .parse::<u16>()
            .is_ok_and(|n| (MIN_CODE..=MAX_CODE).contains(&n))
}
