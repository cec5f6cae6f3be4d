use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::menu::{deserialize_selector, Menu};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BakeRequest {
    // Raw selector as sent by the caller; may lie outside the menu.
    #[serde(default, deserialize_with = "deserialize_selector")]
    pub menu: i32,
}

impl BakeRequest {
    pub fn new(menu: Menu) -> Self {
        Self { menu: menu.value() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BakeResponse {
    pub pancake: Pancake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pancake {
    pub menu: Menu,
    pub chef_name: String,
    pub technical_score: f32,
    pub create_time: Timestamp,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

impl Timestamp {
    pub fn now() -> Self {
        Self::from(Utc::now())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(time: DateTime<Utc>) -> Self {
        // subsec nanos never exceed 1_999_999_999 (leap second), which fits i32
        Self {
            seconds: time.timestamp(),
            nanos: time.timestamp_subsec_nanos() as i32,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRequest {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub report: Report,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Report {
    pub bake_counts: Vec<BakeCount>,
}

impl Report {
    pub fn count_of(&self, menu: Menu) -> Option<i32> {
        self.bake_counts
            .iter()
            .find(|entry| entry.menu == menu)
            .map(|entry| entry.count)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BakeCount {
    pub menu: Menu,
    pub count: i32,
}
