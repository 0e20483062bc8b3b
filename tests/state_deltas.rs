use nba_terminal::aggregate::{CareerSummary, ShotPartition, partition_shots, points_trend};
use nba_terminal::state::{
    AppState, CareerRow, CareerView, Delta, NoShotReason, PlayerIdentity, SearchOutcome,
    SearchStatus, ShotOutcome, ShotRecord, ShotStatus, Tab, apply_delta,
};

fn career_view(query: &str, id: u32) -> CareerView {
    let rows = vec![CareerRow {
        season_id: "2023-24".to_string(),
        gp: 74,
        pts: 1956,
        ast: 378,
        ..CareerRow::default()
    }];
    CareerView {
        query: query.to_string(),
        player: PlayerIdentity {
            name: "Stephen Curry".to_string(),
            id,
        },
        summary: CareerSummary::from_rows(&rows),
        trend: points_trend(&rows),
        rows,
        from_cache: false,
    }
}

fn found_state(id: u32) -> AppState {
    let mut state = AppState::new("Stephen Curry", "2023-24");
    let query = state.begin_search();
    apply_delta(
        &mut state,
        Delta::SearchFinished(SearchOutcome::Found(career_view(&query, id))),
    );
    state
}

fn made_partition() -> ShotPartition {
    partition_shots(&[ShotRecord {
        made_flag: Some(1),
        ..ShotRecord::default()
    }])
}

#[test]
fn starts_idle_with_default_name() {
    let state = AppState::new("Stephen Curry", "2023-24");
    assert_eq!(state.status, SearchStatus::Idle);
    assert_eq!(state.input, "Stephen Curry");
    assert_eq!(state.tab, Tab::Trend);
}

#[test]
fn search_moves_through_searching_to_found() {
    let mut state = AppState::new("Stephen Curry", "2023-24");
    let query = state.begin_search();
    assert_eq!(
        state.status,
        SearchStatus::Searching {
            name: "Stephen Curry".to_string()
        }
    );
    apply_delta(
        &mut state,
        Delta::SearchFinished(SearchOutcome::Found(career_view(&query, 201939))),
    );
    assert_eq!(state.found_player().map(|p| p.id), Some(201939));
    assert!(state.logs.back().is_some_and(|l| l.contains("[INFO] Loaded 1 seasons")));
}

#[test]
fn not_found_and_failed_outcomes() {
    let mut state = AppState::new("Nobody", "2023-24");
    state.begin_search();
    apply_delta(
        &mut state,
        Delta::SearchFinished(SearchOutcome::NotFound {
            query: "Nobody".to_string(),
        }),
    );
    assert_eq!(
        state.status,
        SearchStatus::NotFound {
            name: "Nobody".to_string()
        }
    );

    state.input = "Stephen Curry".to_string();
    state.begin_search();
    apply_delta(
        &mut state,
        Delta::SearchFinished(SearchOutcome::FetchFailed {
            query: "Stephen Curry".to_string(),
            player: PlayerIdentity {
                name: "Stephen Curry".to_string(),
                id: 201939,
            },
            error: "request failed: timed out".to_string(),
        }),
    );
    assert!(matches!(
        &state.status,
        SearchStatus::FetchFailed { error, .. } if error.contains("timed out")
    ));
}

#[test]
fn stale_search_results_are_dropped() {
    let mut state = found_state(201939);
    state.input = "LeBron James".to_string();
    state.begin_search();
    apply_delta(
        &mut state,
        Delta::SearchFinished(SearchOutcome::Found(career_view("Stephen Curry", 201939))),
    );
    assert!(matches!(state.status, SearchStatus::Searching { .. }));
}

#[test]
fn shots_are_requested_only_on_the_shot_tab() {
    let mut state = found_state(201939);
    assert!(state.pending_shot_request().is_none());

    state.next_tab();
    assert_eq!(state.tab, Tab::Shots);
    let player = state.pending_shot_request().expect("shots should be requested");
    assert_eq!(player.id, 201939);

    state.mark_shots_loading();
    assert!(state.pending_shot_request().is_none());

    apply_delta(
        &mut state,
        Delta::ShotsFinished {
            player_id: 201939,
            outcome: ShotOutcome::Loaded(made_partition()),
        },
    );
    assert!(matches!(state.shots, ShotStatus::Ready(ref p) if p.made.len() == 1));
}

#[test]
fn shots_for_another_player_are_discarded() {
    let mut state = found_state(201939);
    state.tab = Tab::Shots;
    state.mark_shots_loading();
    apply_delta(
        &mut state,
        Delta::ShotsFinished {
            player_id: 2544,
            outcome: ShotOutcome::Loaded(made_partition()),
        },
    );
    assert_eq!(state.shots, ShotStatus::Loading);
}

#[test]
fn failed_shot_fetch_is_a_soft_warning() {
    let mut state = found_state(201939);
    state.tab = Tab::Shots;
    state.mark_shots_loading();
    apply_delta(
        &mut state,
        Delta::ShotsFinished {
            player_id: 201939,
            outcome: ShotOutcome::NoData(NoShotReason::Failed("http 500".to_string())),
        },
    );
    assert!(matches!(state.shots, ShotStatus::NoData(NoShotReason::Failed(_))));
    assert!(state.found().is_some());
    assert!(state.logs.back().is_some_and(|l| l.contains("[WARN]")));
}

#[test]
fn new_search_resets_shot_view() {
    let mut state = found_state(201939);
    state.tab = Tab::Shots;
    state.shots = ShotStatus::Ready(made_partition());
    state.begin_search();
    assert_eq!(state.shots, ShotStatus::NotRequested);
    assert!(state.pending_shot_request().is_none());
}

#[test]
fn tabs_wrap_both_ways() {
    let mut state = AppState::new("", "2023-24");
    state.prev_tab();
    assert_eq!(state.tab, Tab::Table);
    state.next_tab();
    assert_eq!(state.tab, Tab::Trend);
}

#[test]
fn log_ring_is_bounded() {
    let mut state = AppState::new("", "2023-24");
    for idx in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("[INFO] line {idx}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert!(state.logs.back().is_some_and(|l| l.ends_with("line 249")));
}

#[test]
fn table_scroll_is_clamped() {
    let mut state = found_state(201939);
    state.scroll_table_down();
    state.scroll_table_down();
    assert_eq!(state.table_scroll, 0);
    state.scroll_table_up();
    assert_eq!(state.table_scroll, 0);
}
