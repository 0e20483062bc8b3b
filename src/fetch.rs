use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::memo::{Memo, Source};
use crate::state::{CareerRow, ShotRecord};
use crate::stats_api::{StatsSource, parse_career_json, parse_shot_chart_json};

/// Memoized, rate-limited access to career and shot chart tables.
pub struct StatsFetcher<S> {
    source: S,
    delay: Duration,
    career: Memo<Vec<CareerRow>>,
    shots: Memo<Vec<ShotRecord>>,
}

impl<S: StatsSource> StatsFetcher<S> {
    pub fn new(source: S, delay: Duration, ttl: Option<Duration>) -> Self {
        Self {
            source,
            delay,
            career: Memo::new(ttl),
            shots: Memo::new(ttl),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Season rows in feed order. Failures are returned, never cached.
    pub fn fetch_career(&self, player_id: u32) -> Result<(Vec<CareerRow>, Source)> {
        self.career
            .get_or_try_insert_with("fetch_career", &player_id.to_string(), || {
                self.pause();
                let body = self.source.career_stats(player_id)?;
                parse_career_json(&body).context("unreadable career stats")
            })
    }

    pub fn fetch_shots(&self, player_id: u32, season: &str) -> Result<(Vec<ShotRecord>, Source)> {
        let args = format!("{player_id}:{season}");
        self.shots.get_or_try_insert_with("fetch_shots", &args, || {
            self.pause();
            let body = self.source.shot_chart(player_id, season)?;
            parse_shot_chart_json(&body).context("unreadable shot chart")
        })
    }

    pub fn clear(&self) -> usize {
        self.career.clear() + self.shots.clear()
    }

    fn pause(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}
