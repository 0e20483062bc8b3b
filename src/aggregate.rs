use crate::state::{CareerRow, ShotRecord};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CareerSummary {
    pub total_points: u64,
    pub total_games: u64,
    pub total_assists: u64,
    pub points_per_game: f64,
}

impl CareerSummary {
    pub fn from_rows(rows: &[CareerRow]) -> Self {
        Self {
            total_points: total_points(rows),
            total_games: total_games(rows),
            total_assists: total_assists(rows),
            points_per_game: career_points_per_game(rows),
        }
    }
}

pub fn total_points(rows: &[CareerRow]) -> u64 {
    rows.iter().map(|row| row.pts).sum()
}

pub fn total_games(rows: &[CareerRow]) -> u64 {
    rows.iter().map(|row| row.gp).sum()
}

pub fn total_assists(rows: &[CareerRow]) -> u64 {
    rows.iter().map(|row| row.ast).sum()
}

/// Career points divided by career games, to one decimal. A player with no
/// recorded games averages 0.
pub fn career_points_per_game(rows: &[CareerRow]) -> f64 {
    let games = total_games(rows);
    if games == 0 {
        return 0.0;
    }
    round1(total_points(rows) as f64 / games as f64)
}

/// (season, points) in feed order.
pub fn points_trend(rows: &[CareerRow]) -> Vec<(String, f64)> {
    rows.iter()
        .map(|row| (row.season_id.clone(), row.pts as f64))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShotPartition {
    pub made: Vec<ShotRecord>,
    pub missed: Vec<ShotRecord>,
    /// Attempts whose flag was neither 1 nor 0.
    pub excluded: usize,
}

impl ShotPartition {
    pub fn attempts(&self) -> usize {
        self.made.len() + self.missed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts() == 0
    }

    /// Made share of classified attempts, in percent.
    pub fn field_goal_pct(&self) -> Option<f64> {
        let attempts = self.attempts();
        if attempts == 0 {
            return None;
        }
        Some(round1(self.made.len() as f64 * 100.0 / attempts as f64))
    }
}

pub fn partition_shots(rows: &[ShotRecord]) -> ShotPartition {
    let mut partition = ShotPartition::default();
    for shot in rows {
        match shot.made_flag {
            Some(1) => partition.made.push(shot.clone()),
            Some(0) => partition.missed.push(shot.clone()),
            _ => partition.excluded += 1,
        }
    }
    partition
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `4020` -> `"4,020"`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
