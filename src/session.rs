use crate::aggregate::{CareerSummary, partition_shots, points_trend};
use crate::config::Config;
use crate::fetch::StatsFetcher;
use crate::memo::Source;
use crate::roster::{IdentityResolver, Roster};
use crate::state::{CareerView, NoShotReason, PlayerIdentity, SearchOutcome, ShotOutcome};
use crate::stats_api::StatsSource;

/// Resolve, fetch and aggregate for one dashboard session.
pub struct Session<S> {
    resolver: IdentityResolver,
    fetcher: StatsFetcher<S>,
    shot_season: String,
}

impl<S: StatsSource> Session<S> {
    pub fn new(roster: Roster, source: S, config: &Config) -> Self {
        Self {
            resolver: IdentityResolver::new(roster),
            fetcher: StatsFetcher::new(source, config.request_delay, config.cache_ttl),
            shot_season: config.shot_season.clone(),
        }
    }

    pub fn shot_season(&self) -> &str {
        &self.shot_season
    }

    pub fn fetcher(&self) -> &StatsFetcher<S> {
        &self.fetcher
    }

    /// Unknown names never reach the network.
    pub fn search(&self, name: &str) -> SearchOutcome {
        let Some(player) = self.resolver.resolve(name) else {
            return SearchOutcome::NotFound {
                query: name.to_string(),
            };
        };

        match self.fetcher.fetch_career(player.id) {
            Ok((rows, source)) => SearchOutcome::Found(CareerView {
                query: name.to_string(),
                summary: CareerSummary::from_rows(&rows),
                trend: points_trend(&rows),
                player,
                rows,
                from_cache: source == Source::Cache,
            }),
            Err(err) => SearchOutcome::FetchFailed {
                query: name.to_string(),
                player,
                error: format!("{err:#}"),
            },
        }
    }

    /// Errors and empty seasons both end up as `NoData`, with the reason kept.
    pub fn shot_chart(&self, player: &PlayerIdentity) -> ShotOutcome {
        match self.fetcher.fetch_shots(player.id, &self.shot_season) {
            Ok((shots, _)) if shots.is_empty() => ShotOutcome::NoData(NoShotReason::Empty),
            Ok((shots, _)) => ShotOutcome::Loaded(partition_shots(&shots)),
            Err(err) => ShotOutcome::NoData(NoShotReason::Failed(format!("{err:#}"))),
        }
    }

    pub fn clear_cache(&self) -> usize {
        self.resolver.clear() + self.fetcher.clear()
    }
}
