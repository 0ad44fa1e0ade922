// In-memory batch loader
//
// Serves a fixed set of samples, cycling through them forever. With
// shuffling enabled the order is re-drawn every time the cursor wraps.

use anyhow::{bail, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{DataLoader, Sample};

pub struct InMemoryLoader {
    samples: Vec<Sample>,
    order: Vec<usize>,
    cursor: usize,
    rng: Option<StdRng>,
}

impl InMemoryLoader {
    /// Sequential loader over `samples`
    pub fn new(samples: Vec<Sample>) -> Self {
        let order = (0..samples.len()).collect();
        Self {
            samples,
            order,
            cursor: 0,
            rng: None,
        }
    }

    /// Shuffle with a fixed seed, reshuffling at every wrap-around
    pub fn shuffled(mut self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        self.order.shuffle(&mut rng);
        self.rng = Some(rng);
        self.cursor = 0;
        self
    }

    /// Rewind to the start of the sample order
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    fn next_index(&mut self) -> usize {
        if self.cursor >= self.order.len() {
            self.cursor = 0;
            if let Some(rng) = self.rng.as_mut() {
                self.order.shuffle(rng);
            }
        }
        let idx = self.order[self.cursor];
        self.cursor += 1;
        idx
    }
}

#[async_trait]
impl DataLoader for InMemoryLoader {
    async fn len(&self) -> Result<usize> {
        Ok(self.samples.len())
    }

    async fn next_batch(&mut self, batch_size: usize) -> Result<Vec<Sample>> {
        if self.samples.is_empty() {
            bail!("Cannot draw a batch from an empty loader");
        }

        let batch = (0..batch_size)
            .map(|_| {
                let idx = self.next_index();
                self.samples[idx].clone()
            })
            .collect();

        Ok(batch)
    }
}
