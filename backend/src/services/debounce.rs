//! Debounced suggestion regeneration.
//!
//! Requests arriving within the quiet period of each other collapse into a
//! single run of the latest one. Each run fetches the records of the
//! requested range, generates on the blocking pool and replaces the
//! generator's store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::suggestions::{GenerationParams, SuggestionGenerator};
use crate::db::repository::AnalyticsRepository;
use crate::models::TimeDomain;

#[derive(Debug, Clone, Copy, PartialEq)]
struct SuggestionRequest {
    range: TimeDomain,
    params: GenerationParams,
}

/// Handle of the debouncing task. The task is aborted on drop; use
/// [`SuggestionTrigger::flush`] to run a pending request before stopping.
pub struct SuggestionTrigger {
    requests: Option<mpsc::UnboundedSender<SuggestionRequest>>,
    runs: watch::Receiver<u64>,
    task: Option<JoinHandle<()>>,
}

impl SuggestionTrigger {
    pub fn spawn(
        generator: SuggestionGenerator,
        repo: Arc<dyn AnalyticsRepository>,
        delay: Duration,
    ) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (runs_tx, runs_rx) = watch::channel(0);
        let task = tokio::spawn(debounce_loop(request_rx, runs_tx, generator, repo, delay));

        Self {
            requests: Some(request_tx),
            runs: runs_rx,
            task: Some(task),
        }
    }

    /// Schedule a regeneration; returns `false` when the task is gone.
    pub fn request(&self, range: TimeDomain, params: GenerationParams) -> bool {
        match &self.requests {
            Some(tx) => tx.send(SuggestionRequest { range, params }).is_ok(),
            None => false,
        }
    }

    /// Number of generation runs finished so far.
    pub fn completed_runs(&self) -> u64 {
        *self.runs.borrow()
    }

    /// Watch the completed-run counter.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.runs.clone()
    }

    /// Stop accepting requests, run any pending one right away and wait for
    /// the task to finish.
    pub async fn flush(mut self) {
        self.requests.take();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                log::error!("suggestion trigger stopped abnormally: {}", e);
            }
        }
    }
}

impl Drop for SuggestionTrigger {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn debounce_loop(
    mut requests: mpsc::UnboundedReceiver<SuggestionRequest>,
    runs: watch::Sender<u64>,
    generator: SuggestionGenerator,
    repo: Arc<dyn AnalyticsRepository>,
    delay: Duration,
) {
    while let Some(first) = requests.recv().await {
        let mut latest = first;
        let mut closed = false;

        loop {
            tokio::select! {
                next = requests.recv() => match next {
                    Some(request) => latest = request,
                    None => {
                        closed = true;
                        break;
                    }
                },
                _ = tokio::time::sleep(delay) => break,
            }
        }

        regenerate(&generator, repo.as_ref(), latest).await;
        runs.send_modify(|n| *n += 1);

        if closed {
            break;
        }
    }
    log::debug!("suggestion trigger stopped");
}

async fn regenerate(
    generator: &SuggestionGenerator,
    repo: &dyn AnalyticsRepository,
    request: SuggestionRequest,
) {
    let records = match repo.fetch_records(request.range).await {
        Ok(records) => records,
        Err(e) => {
            log::error!("could not fetch records for suggestions: {}", e);
            return;
        }
    };

    let generator = generator.clone();
    let run = tokio::task::spawn_blocking(move || {
        generator.run(&records, &request.range, &request.params).len()
    })
    .await;

    match run {
        Ok(count) => log::debug!("debounced run produced {} suggestions", count),
        Err(e) => log::error!("suggestion generation task failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuggestionSettings;
    use crate::db::LocalRepository;
    use crate::models::{CrimeRecord, SuggestionKind};
    use crate::services::SuggestionStore;

    fn setup() -> (SuggestionGenerator, Arc<dyn AnalyticsRepository>) {
        let mut ts: Vec<f64> = (0..100).map(|i| i as f64 * 10.0 + 1.0).collect();
        ts.extend((0..200).map(|i| 400.0 + i as f64 * 0.25));
        let repo = LocalRepository::with_records(ts.into_iter().map(CrimeRecord::new).collect());
        let generator = SuggestionGenerator::new(SuggestionSettings::default(), SuggestionStore::new());
        (generator, Arc::new(repo))
    }

    fn range() -> TimeDomain {
        TimeDomain::new(0.0, 1000.0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_request_wins_after_quiet_period() {
        let (generator, repo) = setup();
        let trigger = SuggestionTrigger::spawn(generator.clone(), repo, Duration::from_millis(400));
        let mut runs = trigger.subscribe();

        assert!(trigger.request(range(), GenerationParams::default()));
        tokio::time::sleep(Duration::from_millis(399)).await;
        assert_eq!(trigger.completed_runs(), 0);

        let only_warp = GenerationParams {
            warp_count: 1,
            interval_count: 0,
            ..Default::default()
        };
        assert!(trigger.request(range(), only_warp));
        tokio::time::sleep(Duration::from_millis(399)).await;
        assert_eq!(trigger.completed_runs(), 0);

        runs.changed().await.unwrap();
        assert_eq!(*runs.borrow(), 1);

        let stored = generator.store().list();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind(), SuggestionKind::WarpProfile);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_runs_pending_request() {
        let (generator, repo) = setup();
        let trigger = SuggestionTrigger::spawn(generator.clone(), repo, Duration::from_secs(60));

        trigger.request(range(), GenerationParams::default());
        trigger.flush().await;

        assert_eq!(generator.store().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_run_separately() {
        let (generator, repo) = setup();
        let trigger = SuggestionTrigger::spawn(generator, repo, Duration::from_millis(400));
        let mut runs = trigger.subscribe();

        trigger.request(range(), GenerationParams::default());
        runs.changed().await.unwrap();
        trigger.request(range(), GenerationParams::default());
        runs.changed().await.unwrap();

        assert_eq!(trigger.completed_runs(), 2);
    }
}
