//! 7-bag randomizer for piece generation
//!
//! Tetris uses a "7-bag" system where all 7 pieces are shuffled,
//! then dealt out before reshuffling. This prevents long droughts.
//!
//! The random source is injected so a seeded bag deals the same sequence
//! every time.

use std::collections::VecDeque;

use crate::tetromino::TetrominoType;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct Bag<R = ChaCha8Rng> {
    /// Pending pieces, front is dealt next
    queue: VecDeque<TetrominoType>,
    rng: R,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl Bag {
    /// Create a bag seeded from system entropy
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    /// Create a bag with a fixed seed (reproducible sequence)
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Bag<R> {
    /// Create a bag that draws its shuffles from `rng`
    pub fn with_rng(rng: R) -> Self {
        Self {
            queue: VecDeque::with_capacity(14),
            rng,
        }
    }

    /// Get the next piece from the queue
    pub fn next(&mut self) -> TetrominoType {
        if self.queue.is_empty() {
            self.refill();
        }
        match self.queue.pop_front() {
            Some(piece) => piece,
            None => unreachable!("bag refill always adds 7 pieces"),
        }
    }

    /// Preview the next `count` pieces without removing them, refilling as needed
    pub fn peek(&mut self, count: usize) -> &[TetrominoType] {
        while self.queue.len() < count {
            self.refill();
        }
        &self.queue.make_contiguous()[..count]
    }

    /// Pieces currently queued, in deal order
    pub fn queued(&self) -> impl ExactSizeIterator<Item = TetrominoType> + '_ {
        self.queue.iter().copied()
    }

    /// Drop all pending pieces; the random stream continues
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Append a new shuffled bag to the queue
    pub fn refill(&mut self) {
        let mut new_bag = TetrominoType::all();
        // Fisher-Yates: walks from the last index down, swapping with a uniform index in [0, i]
        new_bag.shuffle(&mut self.rng);
        self.queue.extend(new_bag);
    }
}
