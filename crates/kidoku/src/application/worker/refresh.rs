use std::collections::HashMap;
use std::fmt::Display;

use async_trait::async_trait;
use kidoku_lib::models::SourceObservation;
use tokio::{
    task::JoinHandle,
    time::{self, Instant},
};

use crate::domain::{
    entities::summary::MatchSummary, repositories::series::SeriesRepository,
    services::summary::SummaryService,
};

/// Supplies the current raw per-series observations on demand. Implemented
/// by the scraping collaborator; the worker never fetches anything itself.
#[async_trait]
pub trait ObservationProvider {
    async fn observations(
        &self,
    ) -> Result<HashMap<String, Vec<SourceObservation>>, anyhow::Error>;
}

pub enum RefreshCommand {
    Refresh(tokio::sync::oneshot::Sender<Result<(), anyhow::Error>>),
}

impl Display for RefreshCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshCommand::Refresh(_) => write!(f, "RefreshCommand::Refresh"),
        }
    }
}

pub type RefreshCommandSender = flume::Sender<RefreshCommand>;
pub type RefreshCommandReceiver = flume::Receiver<RefreshCommand>;

/// Latest computed aggregate. `watch` semantics give natural coalescing on
/// the consumer side too: a slow reader only ever sees the newest value.
pub type SummariesReceiver = tokio::sync::watch::Receiver<Vec<MatchSummary>>;

struct RefreshWorker<R, P>
where
    R: SeriesRepository,
    P: ObservationProvider,
{
    period: u64,
    service: SummaryService<R>,
    provider: P,
    summaries_tx: tokio::sync::watch::Sender<Vec<MatchSummary>>,
    command_rx: RefreshCommandReceiver,
}

impl<R, P> RefreshWorker<R, P>
where
    R: SeriesRepository,
    P: ObservationProvider,
{
    async fn refresh(&self) -> Result<(), anyhow::Error> {
        let observations = self.provider.observations().await?;
        let summaries = self.service.compute_summaries(&observations).await?;
        self.summaries_tx.send_replace(summaries);

        Ok(())
    }

    /// Single consumer loop: commands and the periodic tick are handled one
    /// at a time, so at most one recomputation is ever outstanding and
    /// triggers that pile up while one runs are simply sequenced behind it.
    async fn run(self) {
        // the interval is never polled when period is 0; max(1) only keeps
        // the Duration constructor happy
        let mut refresh_interval =
            time::interval(time::Duration::from_secs(self.period.max(1)));

        loop {
            tokio::select! {
                cmd = self.command_rx.recv_async() => {
                    let Ok(cmd) = cmd else {
                        info!("all command senders dropped, stopping refresh worker");
                        break;
                    };
                    info!("received command: {cmd}");
                    match cmd {
                        RefreshCommand::Refresh(tx) => {
                            let res = self.refresh().await;
                            if tx.send(res).is_err() {
                                info!("failed to send refresh result");
                            }
                        }
                    }
                }
                // branch is disabled outright when no cadence is configured,
                // so a command-only worker never wakes on the interval
                start = refresh_interval.tick(), if self.period > 0 => {
                    info!("start periodic refresh");

                    if let Err(e) = self.refresh().await {
                        error!("failed to refresh summaries: {e}");
                    }

                    info!("periodic refresh done in {:?}", Instant::now() - start);
                }
            }
        }
    }
}

/// Spawn the refresh worker. `period` is the automatic refresh cadence in
/// seconds; 0 disables the periodic path and leaves only on-demand commands.
pub fn start<R, P>(
    period: u64,
    repo: R,
    provider: P,
) -> (SummariesReceiver, RefreshCommandSender, JoinHandle<()>)
where
    R: SeriesRepository + Send + Sync + 'static,
    P: ObservationProvider + Send + Sync + 'static,
{
    let (summaries_tx, summaries_rx) = tokio::sync::watch::channel(Vec::new());
    let (command_tx, command_rx) = flume::unbounded();

    let worker = RefreshWorker {
        period,
        service: SummaryService::new(repo),
        provider,
        summaries_tx,
        command_rx,
    };

    let handle = tokio::spawn(worker.run());

    (summaries_rx, command_tx, handle)
}
