use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::session::Session;
use crate::state::{Delta, ProviderCommand, SearchOutcome, ShotOutcome};
use crate::stats_api::StatsSource;

/// Runs commands one at a time on a worker thread until either channel closes.
pub fn spawn_provider<S>(
    session: Session<S>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()>
where
    S: StatsSource + 'static,
{
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            if handle_command(&session, cmd, &tx).is_err() {
                break;
            }
        }
    })
}

/// Executes one command. Errors only when the UI side has hung up.
pub fn handle_command<S: StatsSource>(
    session: &Session<S>,
    cmd: ProviderCommand,
    tx: &Sender<Delta>,
) -> Result<(), std::sync::mpsc::SendError<Delta>> {
    match cmd {
        ProviderCommand::Search { name } => {
            tx.send(Delta::Log(format!("[INFO] Searching for '{name}'")))?;
            let outcome = session.search(&name);
            if let SearchOutcome::Found(view) = &outcome
                && view.summary.total_games == 0
            {
                tx.send(Delta::Log(format!(
                    "[INFO] {} has no recorded games",
                    view.player.name
                )))?;
            }
            tx.send(Delta::SearchFinished(outcome))?;
        }
        ProviderCommand::FetchShots { player } => {
            tx.send(Delta::Log(format!(
                "[INFO] Fetching {} shot chart for {}",
                session.shot_season(),
                player.name
            )))?;
            let outcome = session.shot_chart(&player);
            if let ShotOutcome::Loaded(partition) = &outcome {
                tx.send(Delta::Log(format!(
                    "[INFO] {} attempts ({} made, {} missed, {} unflagged)",
                    partition.attempts() + partition.excluded,
                    partition.made.len(),
                    partition.missed.len(),
                    partition.excluded
                )))?;
            }
            tx.send(Delta::ShotsFinished {
                player_id: player.id,
                outcome,
            })?;
        }
        ProviderCommand::ClearCache => {
            let entries = session.clear_cache();
            tx.send(Delta::CacheCleared { entries })?;
        }
    }
    Ok(())
}
