//! One reparse-and-synchronize pipeline per open file.
//!
//! The worker task coalesces triggers (document edits, prepare requests,
//! saves, deep-check requests) into a single pending deadline and runs the
//! cycle on the blocking pool. A cycle never publishes results for text that
//! changed while it was parsing: it parses again instead.

use super::context::SynchronizationContext;
use super::interface::{InterfaceSyncEngine, SyncOutcome};
use crate::cache::ParseCache;
use crate::error::{Result, SyncError};
use crate::model::{ChangeMask, ChangeRecord, SourceStatus};
use crate::source::SourceFile;
use parking_lot::Mutex;
use srcsync_api::SourceParser;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ReparseReport {
    pub status: SourceStatus,
    /// Document revision the published model reflects.
    pub revision: u64,
    pub changes: Vec<ChangeRecord>,
    /// Parses needed before the text stayed still long enough to publish.
    pub attempts: usize,
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub reparse: ReparseReport,
    /// `None` when interface synchronization did not run.
    pub sync: Option<SyncOutcome>,
}

type Reply = oneshot::Sender<Result<CycleReport>>;

enum Request {
    Prepare { urgent: bool, reply: Reply },
    Saved,
    DeepCheck,
    Cancel,
}

/// Awaitable result of [`SynchronizationCoordinator::prepare`].
pub struct PrepareHandle {
    receiver: oneshot::Receiver<Result<CycleReport>>,
}

impl PrepareHandle {
    pub async fn wait(self) -> Result<CycleReport> {
        self.receiver.await.unwrap_or_else(|_| Err(SyncError::Cancelled))
    }

    /// Blocks the calling thread until the cycle finished. Must not be called
    /// from inside a tokio runtime, where it would stall the worker it waits on.
    pub fn wait_blocking(self) -> Result<CycleReport> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(SyncError::Reentrant);
        }
        self.receiver
            .blocking_recv()
            .unwrap_or_else(|_| Err(SyncError::Cancelled))
    }
}

pub struct SynchronizationCoordinator {
    file: Arc<SourceFile>,
    parser: Arc<dyn SourceParser>,
    cache: ParseCache,
    context: Weak<SynchronizationContext>,
    requests: mpsc::UnboundedSender<Request>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<Request>>>,
    cancel_token: CancellationToken,
    serial: Mutex<()>,
}

impl SynchronizationCoordinator {
    pub(crate) fn new(
        file: Arc<SourceFile>,
        parser: Arc<dyn SourceParser>,
        context: Weak<SynchronizationContext>,
        cache_capacity: usize,
    ) -> Self {
        let (requests, receiver) = mpsc::unbounded_channel();
        Self {
            file,
            parser,
            cache: ParseCache::new(cache_capacity),
            context,
            requests,
            receiver: Mutex::new(Some(receiver)),
            cancel_token: CancellationToken::new(),
            serial: Mutex::new(()),
        }
    }

    pub fn file(&self) -> &Arc<SourceFile> {
        &self.file
    }

    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }

    /// Spawns the worker task on the current tokio runtime.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| SyncError::Internal("no tokio runtime to start the worker on".to_string()))?;
        let receiver = self
            .receiver
            .lock()
            .take()
            .ok_or_else(|| SyncError::Internal("worker already started".to_string()))?;
        let revisions = self.file.document().subscribe();
        handle.spawn(self.clone().run(receiver, revisions));
        Ok(())
    }

    /// Schedules a cycle. Urgent requests run as soon as the worker is free;
    /// others wait for the debounce delay. Pending requests share one cycle.
    pub fn prepare(&self, urgent: bool) -> PrepareHandle {
        let (reply, receiver) = oneshot::channel();
        if self.requests.send(Request::Prepare { urgent, reply }).is_err() {
            debug!("Worker for {} is gone, prepare dropped", self.file.name());
        }
        PrepareHandle { receiver }
    }

    /// The document was saved: run a cycle now.
    pub fn saved(&self) {
        let _ = self.requests.send(Request::Saved);
    }

    /// Runs a cycle that includes the deep source check, even when
    /// synchronization is disabled for the file.
    pub fn request_deep_check(&self) {
        let _ = self.requests.send(Request::DeepCheck);
    }

    /// Drops the scheduled cycle, failing its waiters with `Cancelled`. A cycle
    /// already running completes.
    pub fn cancel_pending(&self) {
        let _ = self.requests.send(Request::Cancel);
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }

    pub fn release(&self) {
        self.cache.release();
    }

    async fn run(
        self: Arc<Self>,
        mut requests: mpsc::UnboundedReceiver<Request>,
        mut revisions: watch::Receiver<u64>,
    ) {
        let name = self.file.name().to_string();
        info!("Started synchronization worker for {}", name);
        let debounce = Duration::from_millis(
            self.context
                .upgrade()
                .map(|ctx| ctx.settings().debounce_ms)
                .unwrap_or(500),
        );
        let mut deadline: Option<Instant> = None;
        let mut waiters: Vec<Reply> = Vec::new();
        let mut deep_check = false;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    break;
                }
                changed = revisions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let at = Instant::now() + debounce;
                    // A sooner deadline from an urgent request wins.
                    deadline = Some(match deadline {
                        Some(current) if current < Instant::now() + debounce / 2 => current,
                        _ => at,
                    });
                }
                request = requests.recv() => {
                    let Some(request) = request else {
                        break;
                    };
                    let now = Instant::now();
                    match request {
                        Request::Prepare { urgent, reply } => {
                            waiters.push(reply);
                            let at = if urgent { now } else { now + debounce };
                            deadline = Some(deadline.map_or(at, |d| d.min(at)));
                        }
                        Request::Saved => {
                            deadline = Some(now);
                        }
                        Request::DeepCheck => {
                            deep_check = true;
                            deadline = Some(now);
                        }
                        Request::Cancel => {
                            deadline = None;
                            deep_check = false;
                            for waiter in waiters.drain(..) {
                                let _ = waiter.send(Err(SyncError::Cancelled));
                            }
                            debug!("Cancelled pending cycle for {}", name);
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    let deep = std::mem::take(&mut deep_check);
                    let this = self.clone();
                    let result = tokio::task::spawn_blocking(move || this.run_cycle(deep))
                        .await
                        .unwrap_or_else(|e| Err(SyncError::Internal(e.to_string())));
                    if let Err(err) = &result {
                        warn!("Synchronization cycle for {} failed: {}", name, err);
                    }
                    for waiter in waiters.drain(..) {
                        let _ = waiter.send(result.clone());
                    }
                }
            }
        }

        for waiter in waiters.drain(..) {
            let _ = waiter.send(Err(SyncError::Cancelled));
        }
        info!("Synchronization worker for {} stopped", name);
    }

    /// Reparses the document and publishes the diff. Loops while the document
    /// keeps changing under the parser.
    pub fn reparse_now(&self) -> Result<ReparseReport> {
        self.reparse_with(ChangeMask::all())
    }

    /// Like [`reparse_now`](Self::reparse_now), reporting only the change
    /// records `mask` allows. The model is updated in full either way.
    pub fn reparse_with(&self, mask: ChangeMask) -> Result<ReparseReport> {
        let _serial = self.serial.lock();
        let name = self.file.name();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let (text, revision) = self.file.document().snapshot();
            let outcome = self.cache.get_or_parse(&text, self.parser.as_ref());

            let (result, events) = {
                let mut model = self.file.write();
                let guard = self.file.document().lock();
                if guard.revision() != revision {
                    debug!(
                        "{} changed during parse (revision {} -> {}), parsing again",
                        name,
                        revision,
                        guard.revision()
                    );
                    continue;
                }

                let result = match outcome.tree.clone() {
                    None => {
                        model.set_status(SourceStatus::Error);
                        Err(SyncError::Parse(format!(
                            "{}: no usable parse result ({} errors)",
                            name, outcome.error_count
                        )))
                    }
                    Some(tree) => {
                        match model.apply_parse_tree(tree, guard.text(), &guard, mask) {
                            Ok(changes) => {
                                let status = if outcome.is_partial() {
                                    SourceStatus::Partial
                                } else {
                                    SourceStatus::Ok
                                };
                                model.set_status(status);
                                Ok((status, changes))
                            }
                            Err(err) => {
                                model.set_status(SourceStatus::Error);
                                Err(err)
                            }
                        }
                    }
                };
                (result, model.take_events())
            };
            self.file.dispatch(events);

            return match result {
                Ok((status, changes)) => {
                    info!(
                        "Reparsed {} at revision {}: {}, {} changes",
                        name,
                        revision,
                        status,
                        changes.len()
                    );
                    Ok(ReparseReport {
                        status,
                        revision,
                        changes,
                        attempts,
                    })
                }
                Err(err) => {
                    warn!("Reparse of {} failed: {}", name, err);
                    Err(err)
                }
            };
        }
    }

    /// One full cycle: reparse, consistency listeners, interface synchronization.
    pub fn run_cycle(&self, deep_check: bool) -> Result<CycleReport> {
        let reparse = self.reparse_now()?;
        let Some(context) = self.context.upgrade() else {
            return Ok(CycleReport {
                reparse,
                sync: None,
            });
        };

        if !reparse.changes.is_empty() {
            for listener in context.consistency_listeners() {
                listener.source_changed(&self.file, &reparse.changes);
            }
        }

        let settings = context.settings();
        let sync = if deep_check || (settings.enabled && !reparse.changes.is_empty()) {
            let engine = InterfaceSyncEngine::new(context.clone());
            Some(engine.synchronize(&self.file, &reparse.changes, deep_check))
        } else {
            None
        };
        Ok(CycleReport { reparse, sync })
    }
}
