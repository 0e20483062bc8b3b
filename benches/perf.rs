use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use nba_terminal::aggregate::{CareerSummary, partition_shots};
use nba_terminal::roster::Roster;
use nba_terminal::stats_api::{parse_career_json, parse_shot_chart_json};

fn career_json(seasons: usize) -> String {
    let rows = (0..seasons)
        .map(|idx| {
            format!(
                r#"["{}-{:02}","GSW",{},{},{},{},{}]"#,
                2000 + idx,
                (idx + 1) % 100,
                20 + idx,
                70,
                1800 + idx,
                400,
                300
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"{{"resultSets":[{{"name":"SeasonTotalsRegularSeason","headers":["SEASON_ID","TEAM_ABBREVIATION","PLAYER_AGE","GP","PTS","REB","AST"],"rowSet":[{rows}]}}]}}"#
    )
}

fn shot_json(attempts: usize) -> String {
    let rows = (0..attempts)
        .map(|idx| {
            let flag = match idx % 5 {
                0 | 1 => "1",
                4 => "null",
                _ => "0",
            };
            format!(
                r#"["Jump Shot",{},{},{flag}]"#,
                (idx as i64 % 500) - 250,
                (idx as i64 * 7) % 420
            )
        })
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"{{"resultSets":[{{"name":"Shot_Chart_Detail","headers":["ACTION_TYPE","LOC_X","LOC_Y","SHOT_MADE_FLAG"],"rowSet":[{rows}]}}]}}"#
    )
}

fn bench_parse(c: &mut Criterion) {
    let career = career_json(20);
    let shots = shot_json(1_500);

    c.bench_function("parse_career_20_seasons", |b| {
        b.iter(|| parse_career_json(black_box(&career)).expect("valid json"))
    });
    c.bench_function("parse_shot_chart_1500", |b| {
        b.iter(|| parse_shot_chart_json(black_box(&shots)).expect("valid json"))
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let rows = parse_career_json(&career_json(20)).expect("valid json");
    let shots = parse_shot_chart_json(&shot_json(1_500)).expect("valid json");

    c.bench_function("career_summary", |b| {
        b.iter(|| CareerSummary::from_rows(black_box(&rows)))
    });
    c.bench_function("partition_shots_1500", |b| {
        b.iter(|| partition_shots(black_box(&shots)))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let roster = Roster::embedded().expect("embedded roster");
    c.bench_function("resolve_full_scan", |b| {
        b.iter(|| roster.resolve(black_box("pau gasol")))
    });
}

criterion_group!(benches, bench_parse, bench_aggregate, bench_resolve);
criterion_main!(benches);
