//! Worker pool and run orchestration.
//!
//! ```text
//! walker (blocking) ──path queue──▶ worker 0..N ──action queue──▶ report
//! ```
//!
//! The path queue is a bounded channel whose receiver is shared by all
//! workers; each path is delivered to exactly one worker. Every worker sends
//! exactly one action per path it receives. Closing happens in order: the
//! walker finishes and drops its sender, workers drain the queue and exit,
//! their action senders drop, and the report loop ends.
//!
//! A fatal error (unreadable root, protocol violation) returns from [`run`]
//! right away. Dropping the `JoinSet` aborts the remaining workers, so queued
//! paths are never processed.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

use crate::classify::{classify, Verdict};
use crate::client::{query, Endpoint, Transport};
use crate::error::RunError;
use crate::report::Report;
use crate::walker::walk_sources;
use crate::{Action, RunConfig, Verbosity};

/// Capacity of the action queue.
const ACTION_QUEUE_DEPTH: usize = 128;

/// Receiving end of the path queue, shared by all workers.
type PathQueue = Arc<Mutex<mpsc::Receiver<PathBuf>>>;

/// Formats every candidate file under `config.sources`.
///
/// Returns the final [`Report`]; per-file failures are counted in it and
/// never surface as `Err`.
pub async fn run(config: Arc<RunConfig>, transport: Arc<dyn Transport>) -> Result<Report, RunError> {
    if config.endpoints.is_empty() {
        return Err(RunError::NoEndpoints);
    }
    let worker_count = config.worker_count();
    tracing::info!(
        "formatting with {} worker(s) across {} endpoint(s)",
        worker_count,
        config.endpoints.len()
    );

    let (path_tx, path_rx) = mpsc::channel::<PathBuf>(worker_count);
    let path_rx: PathQueue = Arc::new(Mutex::new(path_rx));
    let (action_tx, action_rx) = mpsc::channel::<Action>(ACTION_QUEUE_DEPTH);

    let aggregator = tokio::spawn(Report::collect(action_rx, config.mode));

    let mut pool = JoinSet::new();
    for endpoint in &config.endpoints {
        for _ in 0..config.max_concurrency.max(1) {
            pool.spawn(worker(
                endpoint.clone(),
                Arc::clone(&config),
                Arc::clone(&transport),
                Arc::clone(&path_rx),
                action_tx.clone(),
            ));
        }
    }
    // Only workers may keep the queues alive from here on.
    drop(path_rx);
    drop(action_tx);

    let roots = config.sources.clone();
    let mut walker = tokio::task::spawn_blocking(move || {
        walk_sources(&roots, |path| path_tx.blocking_send(path).is_ok())
    });
    let mut walking = true;

    loop {
        tokio::select! {
            walked = &mut walker, if walking => {
                walking = false;
                let queued = walked.map_err(|e| RunError::Runtime(e.to_string()))??;
                tracing::debug!("walk finished, {} file(s) queued", queued);
            }
            joined = pool.join_next() => match joined {
                Some(result) => result.map_err(|e| RunError::Runtime(e.to_string()))??,
                None => break,
            },
        }
    }
    if walking {
        walker.await.map_err(|e| RunError::Runtime(e.to_string()))??;
    }

    let report = aggregator
        .await
        .map_err(|e| RunError::Runtime(e.to_string()))?;
    tracing::info!("processed {} file(s)", report.total());
    Ok(report)
}

async fn worker(
    endpoint: Endpoint,
    config: Arc<RunConfig>,
    transport: Arc<dyn Transport>,
    paths: PathQueue,
    actions: mpsc::Sender<Action>,
) -> Result<(), RunError> {
    loop {
        let next = paths.lock().await.recv().await;
        let Some(path) = next else {
            break;
        };
        let result = query(
            transport.as_ref(),
            &endpoint,
            &path,
            config.mode.diff,
            &config.format,
        )
        .await;
        let verdict = classify(&path, result, config.mode).await?;
        let action = announce(verdict, config.verbosity);
        if actions.send(action).await.is_err() {
            tracing::debug!("action queue closed, worker for {} exiting", endpoint);
            break;
        }
    }
    Ok(())
}

/// Prints the verdict's diff and message; returns the final action.
///
/// A diff that cannot be written to stdout turns the action into an error.
fn announce(verdict: Verdict, verbosity: Verbosity) -> Action {
    let Verdict {
        action,
        message,
        diff,
    } = verdict;

    if let Some(diff) = diff {
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = stdout.write_all(&diff).and_then(|()| stdout.flush()) {
            eprintln!("error: cannot print diff: {err}");
            return Action::Error;
        }
    }

    let show = match (action, verbosity) {
        (Action::Error, _) => true,
        (_, Verbosity::Quiet) => false,
        (Action::Unchanged, Verbosity::Normal) => false,
        _ => true,
    };
    if show {
        eprintln!("{message}");
    }
    action
}
