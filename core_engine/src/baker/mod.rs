mod counter;
mod scoring;

pub use counter::BakeCounter;
pub use scoring::TechnicalScorer;
use tracing::{debug, warn};

use crate::error::BakeError;
use crate::menu::Menu;
use crate::protocol::{
    BakeCount, BakeRequest, BakeResponse, Pancake, Report, ReportRequest, ReportResponse,
    Timestamp,
};

// One-person kitchen: every pancake is baked by the same chef.
pub const CHEF_NAME: &str = "gami";

#[derive(Debug)]
pub struct Baker {
    counter: BakeCounter,
    scorer: TechnicalScorer,
}

impl Baker {
    pub fn new() -> Self {
        Self::with_scorer(TechnicalScorer::from_clock())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_scorer(TechnicalScorer::with_seed(seed))
    }

    pub fn with_scorer(scorer: TechnicalScorer) -> Self {
        Self {
            counter: BakeCounter::new(),
            scorer,
        }
    }

    pub fn bake(&self, request: &BakeRequest) -> Result<BakeResponse, BakeError> {
        let menu = match Menu::validate(request.menu) {
            Ok(menu) => menu,
            Err(error) => {
                warn!(selector = request.menu, "rejected bake request: {error}");
                return Err(error);
            }
        };

        let create_time = Timestamp::now();
        self.counter.increment(menu);
        let technical_score = self.scorer.next_score();
        debug!(%menu, technical_score, "baked a pancake");

        Ok(BakeResponse {
            pancake: Pancake {
                menu,
                chef_name: CHEF_NAME.to_string(),
                technical_score,
                create_time,
            },
        })
    }

    pub fn report(&self, _request: &ReportRequest) -> ReportResponse {
        let bake_counts = self
            .counter
            .snapshot()
            .into_iter()
            .map(|(menu, count)| BakeCount {
                menu,
                count: narrow_count(count),
            })
            .collect();

        ReportResponse {
            report: Report { bake_counts },
        }
    }
}

// Saturates instead of wrapping past i32::MAX.
fn narrow_count(count: u64) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

impl Default for Baker {
    fn default() -> Self {
        Self::new()
    }
}
