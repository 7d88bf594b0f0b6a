//! 7-bag randomizer for piece generation
//!
//! All 7 pieces are shuffled, then dealt out before reshuffling.
//! This prevents long droughts. Seeded bags replay the same sequence.

use crate::tetromino::TetrominoType;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct Bag {
    /// Preview queue for upcoming pieces
    queue: Vec<TetrominoType>,
    rng: ChaCha8Rng,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl Bag {
    /// Create a new bag randomizer with a random seed
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a bag whose sequence is fixed by `seed`
    pub fn with_seed(seed: u64) -> Self {
        let mut bag = Self {
            queue: Vec::with_capacity(14),
            rng: ChaCha8Rng::seed_from_u64(seed),
        };
        // Fill the queue with at least 2 full bags
        bag.refill();
        bag.refill();
        bag
    }

    /// Get the next piece from the queue
    pub fn next(&mut self) -> TetrominoType {
        // Ensure we always have pieces in the queue
        if self.queue.len() <= 7 {
            self.refill();
        }
        self.queue.remove(0)
    }

    /// Preview the next N pieces without removing them
    pub fn preview(&self, count: usize) -> &[TetrominoType] {
        &self.queue[..count.min(self.queue.len())]
    }

    /// Refill the queue with a new shuffled bag
    fn refill(&mut self) {
        let mut new_bag = TetrominoType::all().to_vec();
        new_bag.shuffle(&mut self.rng);
        self.queue.extend(new_bag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bag_contains_all_pieces() {
        let mut bag = Bag::new();
        let pieces: Vec<_> = (0..7).map(|_| bag.next()).collect();

        // Should contain all 7 unique pieces
        let unique: HashSet<_> = pieces.iter().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_preview_matches_next() {
        let mut bag = Bag::with_seed(3);
        let preview = bag.preview(5).to_vec();
        assert_eq!(preview.len(), 5);
        let dealt: Vec<_> = (0..5).map(|_| bag.next()).collect();
        assert_eq!(preview, dealt);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Bag::with_seed(42);
        let mut b = Bag::with_seed(42);
        for _ in 0..50 {
            assert_eq!(a.next(), b.next());
        }
    }
}
