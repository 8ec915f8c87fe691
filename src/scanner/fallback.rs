// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Randomness for the "potential PII" fallback

use rand::Rng;

/// Source of uniform draws in `[0, 1)` for the fallback heuristic.
///
/// When a scan finds nothing, one value is drawn; the scanner reports a
/// potential PII hit if it exceeds the sensitivity threshold.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Thread-local RNG, the production source
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Never fires the fallback: always draws `0.0`
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFallback;

impl RandomSource for NoFallback {
    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// Always draws the same value
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&mut self) -> f64 {
        self.0
    }
}
