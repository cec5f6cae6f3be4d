use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug)]
pub struct TechnicalScorer {
    rng: Mutex<StdRng>,
}

impl TechnicalScorer {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_clock() -> Self {
        Self::with_seed(clock_seed())
    }

    pub fn next_score(&self) -> f32 {
        self.rng.lock().gen::<f32>()
    }
}

fn clock_seed() -> u64 {
    let now = Utc::now();
    // nanos overflow i64 after 2262; fall back to seconds
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp()) as u64
}
