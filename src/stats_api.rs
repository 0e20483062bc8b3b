use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::http_client::http_client;
use crate::state::{CareerRow, ShotRecord};

pub const CAREER_ENDPOINT: &str = "playercareerstats";
pub const SHOT_CHART_ENDPOINT: &str = "shotchartdetail";

/// Raw access to the stats service. Implementations return the response body.
pub trait StatsSource: Send + Sync {
    fn career_stats(&self, player_id: u32) -> Result<String>;
    fn shot_chart(&self, player_id: u32, season: &str) -> Result<String>;
}

pub struct HttpStatsSource {
    base_url: String,
    timeout: Duration,
}

impl HttpStatsSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url.trim_end_matches('/'))
    }
}

impl StatsSource for HttpStatsSource {
    fn career_stats(&self, player_id: u32) -> Result<String> {
        let client = http_client(self.timeout)?;
        let url = self.endpoint_url(CAREER_ENDPOINT);
        let params = career_params(player_id);
        fetch_stats_json(client, &url, &params).context("career request failed")
    }

    fn shot_chart(&self, player_id: u32, season: &str) -> Result<String> {
        let client = http_client(self.timeout)?;
        let url = self.endpoint_url(SHOT_CHART_ENDPOINT);
        let params = shot_chart_params(player_id, season);
        fetch_stats_json(client, &url, &params).context("shot chart request failed")
    }
}

pub fn career_params(player_id: u32) -> Vec<(&'static str, String)> {
    vec![
        ("PlayerID", player_id.to_string()),
        ("PerMode", "Totals".to_string()),
        ("LeagueID", "00".to_string()),
    ]
}

/// Field-goal attempts for one player across all teams in `season`.
pub fn shot_chart_params(player_id: u32, season: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("PlayerID", player_id.to_string()),
        ("TeamID", "0".to_string()),
        ("Season", season.to_string()),
        ("SeasonType", "Regular Season".to_string()),
        ("ContextMeasure", "FGA".to_string()),
        ("LeagueID", "00".to_string()),
        ("LastNGames", "0".to_string()),
        ("Month", "0".to_string()),
        ("OpponentTeamID", "0".to_string()),
        ("Period", "0".to_string()),
    ];
    // The endpoint rejects requests that omit these, even when blank.
    for key in [
        "AheadBehind",
        "ClutchTime",
        "ContextFilter",
        "DateFrom",
        "DateTo",
        "EndPeriod",
        "EndRange",
        "GameID",
        "GameSegment",
        "Location",
        "Outcome",
        "PlayerPosition",
        "PointDiff",
        "Position",
        "RangeType",
        "RookieYear",
        "SeasonSegment",
        "StartPeriod",
        "StartRange",
        "VsConference",
        "VsDivision",
    ] {
        params.push((key, String::new()));
    }
    params
}

fn fetch_stats_json(client: &Client, url: &str, params: &[(&str, String)]) -> Result<String> {
    let resp = client.get(url).query(params).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow::anyhow!("http {}: {}", status, truncate(&body, 200)));
    }
    Ok(body)
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// One named table of a stats response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultTable {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(header))
    }

    fn require_column(&self, header: &str) -> Result<usize> {
        self.column(header)
            .ok_or_else(|| anyhow::anyhow!("table '{}' has no {header} column", self.name))
    }
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "resultSets", default)]
    result_sets: Option<ResultSets>,
    #[serde(rename = "resultSet", default)]
    result_set: Option<ResultSets>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResultSets {
    Many(Vec<ResultTable>),
    One(ResultTable),
}

pub fn parse_result_tables_json(raw: &str) -> Result<Vec<ResultTable>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow::anyhow!("empty stats response"));
    }
    let parsed: StatsResponse = serde_json::from_str(trimmed).context("invalid stats json")?;
    let sets = parsed
        .result_sets
        .or(parsed.result_set)
        .ok_or_else(|| anyhow::anyhow!("stats response has no result sets"))?;
    Ok(match sets {
        ResultSets::Many(tables) => tables,
        ResultSets::One(table) => vec![table],
    })
}

fn first_table(raw: &str) -> Result<ResultTable> {
    parse_result_tables_json(raw)?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("stats response has no tables"))
}

pub fn parse_career_json(raw: &str) -> Result<Vec<CareerRow>> {
    let table = first_table(raw)?;
    let season = table.require_column("SEASON_ID")?;
    let gp = table.require_column("GP")?;
    let pts = table.require_column("PTS")?;
    let ast = table.require_column("AST")?;

    let col = |name: &str| table.column(name);
    let team = col("TEAM_ABBREVIATION");
    let age = col("PLAYER_AGE");
    let gs = col("GS");
    let min = col("MIN");
    let fgm = col("FGM");
    let fga = col("FGA");
    let fg_pct = col("FG_PCT");
    let fg3m = col("FG3M");
    let fg3a = col("FG3A");
    let fg3_pct = col("FG3_PCT");
    let ftm = col("FTM");
    let fta = col("FTA");
    let ft_pct = col("FT_PCT");
    let reb = col("REB");
    let stl = col("STL");
    let blk = col("BLK");
    let tov = col("TOV");

    let rows = table
        .rows
        .iter()
        .map(|row| {
            let count = |idx: Option<usize>| idx.and_then(|i| cell_count(row, i)).unwrap_or(0);
            let float = |idx: Option<usize>| idx.and_then(|i| cell_f64(row, i));
            CareerRow {
                season_id: cell_string(row, season).unwrap_or_default(),
                team_abbreviation: team.and_then(|i| cell_string(row, i)).unwrap_or_default(),
                player_age: float(age),
                gp: count(Some(gp)),
                gs: count(gs),
                min: float(min).unwrap_or(0.0),
                fgm: count(fgm),
                fga: count(fga),
                fg_pct: float(fg_pct),
                fg3m: count(fg3m),
                fg3a: count(fg3a),
                fg3_pct: float(fg3_pct),
                ftm: count(ftm),
                fta: count(fta),
                ft_pct: float(ft_pct),
                reb: count(reb),
                ast: count(Some(ast)),
                stl: count(stl),
                blk: count(blk),
                tov: count(tov),
                pts: count(Some(pts)),
            }
        })
        .collect();
    Ok(rows)
}

pub fn parse_shot_chart_json(raw: &str) -> Result<Vec<ShotRecord>> {
    let table = first_table(raw)?;
    let loc_x = table.require_column("LOC_X")?;
    let loc_y = table.require_column("LOC_Y")?;
    let made = table.require_column("SHOT_MADE_FLAG")?;
    let action = table.column("ACTION_TYPE");
    let shot_type = table.column("SHOT_TYPE");
    let zone = table.column("SHOT_ZONE_BASIC");
    let distance = table.column("SHOT_DISTANCE");
    let game_date = table.column("GAME_DATE");

    let shots = table
        .rows
        .iter()
        .map(|row| {
            let text = |idx: Option<usize>| idx.and_then(|i| cell_string(row, i));
            ShotRecord {
                loc_x: cell_f64(row, loc_x).unwrap_or(0.0),
                loc_y: cell_f64(row, loc_y).unwrap_or(0.0),
                made_flag: cell_flag(row, made),
                action_type: text(action),
                shot_type: text(shot_type),
                shot_zone_basic: text(zone),
                shot_distance: distance.and_then(|i| cell_f64(row, i)),
                game_date: text(game_date),
            }
        })
        .collect();
    Ok(shots)
}

fn cell_string(row: &[Value], idx: usize) -> Option<String> {
    match row.get(idx)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn cell_f64(row: &[Value], idx: usize) -> Option<f64> {
    match row.get(idx)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn cell_count(row: &[Value], idx: usize) -> Option<u64> {
    let value = row.get(idx)?;
    if let Some(num) = value.as_u64() {
        return Some(num);
    }
    cell_f64(row, idx)
        .filter(|num| num.is_finite() && *num >= 0.0)
        .map(|num| num.round() as u64)
}

// Flags must be integral; 1.0 counts, 0.5 or "yes" does not.
fn cell_flag(row: &[Value], idx: usize) -> Option<i64> {
    let value = row.get(idx)?;
    if let Some(num) = value.as_i64() {
        return Some(num);
    }
    let num = cell_f64(row, idx)?;
    (num.fract() == 0.0).then_some(num as i64)
}
