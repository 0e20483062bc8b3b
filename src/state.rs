use std::collections::VecDeque;

use crate::aggregate::{CareerSummary, ShotPartition};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub name: String,
    pub id: u32,
}

/// One season line from the career endpoint, in feed order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CareerRow {
    pub season_id: String,
    pub team_abbreviation: String,
    pub player_age: Option<f64>,
    pub gp: u64,
    pub gs: u64,
    pub min: f64,
    pub fgm: u64,
    pub fga: u64,
    pub fg_pct: Option<f64>,
    pub fg3m: u64,
    pub fg3a: u64,
    pub fg3_pct: Option<f64>,
    pub ftm: u64,
    pub fta: u64,
    pub ft_pct: Option<f64>,
    pub reb: u64,
    pub ast: u64,
    pub stl: u64,
    pub blk: u64,
    pub tov: u64,
    pub pts: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShotRecord {
    pub loc_x: f64,
    pub loc_y: f64,
    /// 1 = made, 0 = missed; anything else the feed sends is kept as-is or `None`.
    pub made_flag: Option<i64>,
    pub action_type: Option<String>,
    pub shot_type: Option<String>,
    pub shot_zone_basic: Option<String>,
    pub shot_distance: Option<f64>,
    pub game_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CareerView {
    pub query: String,
    pub player: PlayerIdentity,
    pub rows: Vec<CareerRow>,
    pub summary: CareerSummary,
    pub trend: Vec<(String, f64)>,
    pub from_cache: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(CareerView),
    NotFound {
        query: String,
    },
    FetchFailed {
        query: String,
        player: PlayerIdentity,
        error: String,
    },
}

impl SearchOutcome {
    pub fn query(&self) -> &str {
        match self {
            SearchOutcome::Found(view) => view.query.as_str(),
            SearchOutcome::NotFound { query } => query.as_str(),
            SearchOutcome::FetchFailed { query, .. } => query.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoShotReason {
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShotOutcome {
    Loaded(ShotPartition),
    NoData(NoShotReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    Idle,
    Searching { name: String },
    Found(Box<CareerView>),
    NotFound { name: String },
    FetchFailed { name: String, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShotStatus {
    NotRequested,
    Loading,
    Ready(ShotPartition),
    NoData(NoShotReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Trend,
    Shots,
    Table,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Trend, Tab::Shots, Tab::Table];

    pub fn index(self) -> usize {
        match self {
            Tab::Trend => 0,
            Tab::Shots => 1,
            Tab::Table => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub fn tab_label(tab: Tab) -> &'static str {
    match tab {
        Tab::Trend => "Points Trend",
        Tab::Shots => "Shot Chart",
        Tab::Table => "Career Table",
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub input: String,
    pub status: SearchStatus,
    pub shots: ShotStatus,
    pub tab: Tab,
    pub shot_season: String,
    pub table_scroll: usize,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
}

impl AppState {
    pub fn new(default_player: impl Into<String>, shot_season: impl Into<String>) -> Self {
        Self {
            input: default_player.into(),
            status: SearchStatus::Idle,
            shots: ShotStatus::NotRequested,
            tab: Tab::Trend,
            shot_season: shot_season.into(),
            table_scroll: 0,
            help_overlay: false,
            logs: VecDeque::new(),
        }
    }

    /// Enters `Searching` for the current input, from any state.
    pub fn begin_search(&mut self) -> String {
        let name = self.input.clone();
        self.status = SearchStatus::Searching { name: name.clone() };
        self.shots = ShotStatus::NotRequested;
        self.table_scroll = 0;
        name
    }

    pub fn found(&self) -> Option<&CareerView> {
        match &self.status {
            SearchStatus::Found(view) => Some(view.as_ref()),
            _ => None,
        }
    }

    pub fn found_player(&self) -> Option<&PlayerIdentity> {
        self.found().map(|view| &view.player)
    }

    /// The player whose shot chart should be requested now, if any.
    ///
    /// Shots are only fetched while their tab is on screen.
    pub fn pending_shot_request(&self) -> Option<PlayerIdentity> {
        if self.tab != Tab::Shots || self.shots != ShotStatus::NotRequested {
            return None;
        }
        self.found_player().cloned()
    }

    pub fn mark_shots_loading(&mut self) {
        self.shots = ShotStatus::Loading;
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    pub fn prev_tab(&mut self) {
        self.tab = self.tab.prev();
    }

    pub fn scroll_table_down(&mut self) {
        let max = self
            .found()
            .map(|view| view.rows.len().saturating_sub(1))
            .unwrap_or(0);
        self.table_scroll = (self.table_scroll + 1).min(max);
    }

    pub fn scroll_table_up(&mut self) {
        self.table_scroll = self.table_scroll.saturating_sub(1);
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("{stamp} {}", msg.into()));
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SearchFinished(SearchOutcome),
    ShotsFinished {
        player_id: u32,
        outcome: ShotOutcome,
    },
    CacheCleared {
        entries: usize,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Search { name: String },
    FetchShots { player: PlayerIdentity },
    ClearCache,
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SearchFinished(outcome) => {
            let current = match &state.status {
                SearchStatus::Searching { name } => Some(name.as_str()),
                _ => None,
            };
            if current != Some(outcome.query()) {
                // A newer search was started while this one ran.
                state.push_log(format!(
                    "[INFO] Dropped stale result for '{}'",
                    outcome.query()
                ));
                return;
            }

            state.shots = ShotStatus::NotRequested;
            state.table_scroll = 0;
            state.status = match outcome {
                SearchOutcome::Found(view) => {
                    let origin = if view.from_cache { "cache" } else { "network" };
                    state.push_log(format!(
                        "[INFO] Loaded {} seasons for {} ({}) from {origin}",
                        view.rows.len(),
                        view.player.name,
                        view.player.id
                    ));
                    SearchStatus::Found(Box::new(view))
                }
                SearchOutcome::NotFound { query } => {
                    state.push_log(format!("[WARN] No roster match for '{query}'"));
                    SearchStatus::NotFound { name: query }
                }
                SearchOutcome::FetchFailed {
                    query,
                    player,
                    error,
                } => {
                    state.push_log(format!(
                        "[WARN] Career fetch failed for {} ({}): {error}",
                        player.name, player.id
                    ));
                    SearchStatus::FetchFailed { name: query, error }
                }
            };
        }
        Delta::ShotsFinished { player_id, outcome } => {
            let current = state.found_player().map(|player| player.id);
            if current != Some(player_id) || state.shots != ShotStatus::Loading {
                state.push_log(format!("[INFO] Dropped shot data for player {player_id}"));
                return;
            }
            state.shots = match outcome {
                ShotOutcome::Loaded(partition) => ShotStatus::Ready(partition),
                ShotOutcome::NoData(reason) => {
                    if let NoShotReason::Failed(err) = &reason {
                        state.push_log(format!("[WARN] Shot chart fetch failed: {err}"));
                    }
                    ShotStatus::NoData(reason)
                }
            };
        }
        Delta::CacheCleared { entries } => {
            state.push_log(format!("[INFO] Cleared {entries} cached responses"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
