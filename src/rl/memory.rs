//! Bounded replay memory for experience tuples
//!
//! An arena-backed circular buffer: pushes past capacity overwrite the oldest
//! entry, so the memory never grows beyond its configured bound. Batch
//! training draws uniform samples without replacement.

use rand::rngs::StdRng;

use crate::game::Turn;
use crate::rl::observation::STATE_DIM;

/// One transition observed by the agent
#[derive(Debug, Clone, PartialEq)]
pub struct Experience {
    pub state: [f32; STATE_DIM],
    pub action: Turn,
    pub reward: f32,
    pub next_state: [f32; STATE_DIM],
    pub terminal: bool,
}

/// Fixed-capacity FIFO store of past experience
pub struct ReplayMemory {
    buf: Vec<Experience>,
    /// Slot that the next push writes to once the arena is full
    head: usize,
    capacity: usize,
}

impl ReplayMemory {
    /// Create a replay memory holding at most `capacity` experiences
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay memory capacity must be positive");
        Self {
            buf: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    /// Append an experience, evicting the oldest once at capacity
    pub fn push(&mut self, exp: Experience) {
        if self.buf.len() < self.capacity {
            self.buf.push(exp);
        } else {
            self.buf[self.head] = exp;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over stored experiences from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Experience> {
        let (newer, older) = self.buf.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    /// Draw `amount` distinct experiences uniformly at random; if fewer are
    /// stored, returns every experience instead
    pub fn sample<'a>(&'a self, rng: &mut StdRng, amount: usize) -> Vec<&'a Experience> {
        if self.buf.len() <= amount {
            return self.iter().collect();
        }

        rand::seq::index::sample(rng, self.buf.len(), amount)
            .iter()
            .map(|i| &self.buf[i])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn exp(tag: f32) -> Experience {
        Experience {
            state: [tag; STATE_DIM],
            action: Turn::Straight,
            reward: tag,
            next_state: [tag; STATE_DIM],
            terminal: false,
        }
    }

    #[test]
    fn test_push_below_capacity() {
        let mut memory = ReplayMemory::new(4);
        memory.push(exp(1.0));
        memory.push(exp(2.0));

        assert_eq!(memory.len(), 2);
        assert!(!memory.is_empty());
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let mut memory = ReplayMemory::new(3);
        for i in 0..10 {
            memory.push(exp(i as f32));
            assert!(memory.len() <= 3);
        }
        assert_eq!(memory.len(), 3);
    }

    #[test]
    fn test_oldest_entries_evicted_first() {
        let mut memory = ReplayMemory::new(3);
        for i in 0..5 {
            memory.push(exp(i as f32));
        }

        // 0 and 1 were evicted; retained order is oldest to newest
        let rewards: Vec<f32> = memory.iter().map(|e| e.reward).collect();
        assert_eq!(rewards, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_wraparound_keeps_order() {
        let mut memory = ReplayMemory::new(3);
        for i in 0..7 {
            memory.push(exp(i as f32));
        }

        let rewards: Vec<f32> = memory.iter().map(|e| e.reward).collect();
        assert_eq!(rewards, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_sample_returns_all_when_small() {
        let mut memory = ReplayMemory::new(10);
        for i in 0..4 {
            memory.push(exp(i as f32));
        }

        let mut rng = StdRng::seed_from_u64(0);
        let sample = memory.sample(&mut rng, 8);
        assert_eq!(sample.len(), 4);
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut memory = ReplayMemory::new(100);
        for i in 0..100 {
            memory.push(exp(i as f32));
        }

        let mut rng = StdRng::seed_from_u64(0);
        let sample = memory.sample(&mut rng, 32);
        assert_eq!(sample.len(), 32);

        let mut rewards: Vec<f32> = sample.iter().map(|e| e.reward).collect();
        rewards.sort_by(f32::total_cmp);
        rewards.dedup();
        assert_eq!(rewards.len(), 32, "samples must be distinct");
    }
}
