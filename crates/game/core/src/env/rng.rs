//! RNG oracle for combat rolls.
//!
//! Every random number the engine draws (attack, defense, initiative, block
//! and move rolls) goes through [`RngOracle`]. Encounters own their generator,
//! so a fixed seed replays an encounter exactly.

use std::collections::VecDeque;

/// Source of random numbers for the combat engine.
pub trait RngOracle: Send {
    /// Generate the next random u32 value.
    fn next_u32(&mut self) -> u32;

    /// Roll a die with N sides (1-N inclusive). A zero-sided die rolls 0.
    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32() % sides) + 1
    }
}

impl<R: RngOracle + ?Sized> RngOracle for Box<R> {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// PCG-XSH-RR: 64-bit state, 32-bit output. Same seed, same sequence.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Copy, Debug)]
pub struct PcgRng {
    state: u64,
}

impl PcgRng {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub const fn seeded(seed: u64) -> Self {
        Self { state: seed }
    }

    /// `state' = (state × multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl Default for PcgRng {
    fn default() -> Self {
        Self::seeded(0)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&mut self) -> u32 {
        self.state = Self::pcg_step(self.state);
        Self::pcg_output(self.state)
    }
}

/// Replays a fixed list of die results.
///
/// Each scripted value is clamped into the die's `1..=sides` range. When the
/// script runs out every roll returns 1. Zero-sided dice return 0 without
/// consuming a value, matching [`RngOracle::roll_die`].
#[derive(Clone, Debug, Default)]
pub struct ScriptedRng {
    rolls: VecDeque<u32>,
}

impl ScriptedRng {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    pub fn push(&mut self, roll: u32) {
        self.rolls.push_back(roll);
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl RngOracle for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        self.rolls.pop_front().unwrap_or(0)
    }

    fn roll_die(&mut self, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        self.rolls.pop_front().unwrap_or(1).clamp(1, sides)
    }
}

/// Compute a deterministic seed for one encounter.
///
/// # Arguments
///
/// * `base_seed` - Seed configured for the whole process
/// * `nonce` - Encounter sequence number
/// * `room` - Room the encounter takes place in
/// * `context` - Distinguishes independent streams for the same encounter
pub fn compute_seed(base_seed: u64, nonce: u64, room: u32, context: u32) -> u64 {
    // SplitMix64 / FxHash multipliers
    let mut hash = base_seed;
    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (room as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
