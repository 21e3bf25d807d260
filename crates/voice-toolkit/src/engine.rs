//! The speech queue worker.
//!
//! Callers hand text to a bounded queue; a single background thread owns the
//! synthesis backend and drains the queue in FIFO order. Speech is a
//! best-effort UX feature, so nothing in here ever fails observably: a full
//! queue drops the newest utterance, a broken backend degrades to a logged
//! no-op, and a bad utterance never kills the worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use crate::synthesizer::SynthesizerFactory;

#[derive(Clone, Debug)]
pub struct VoiceEngineConfig {
    /// Utterances held while the worker is busy. The newest submission is
    /// dropped once this fills up.
    pub queue_capacity: usize,
    /// How long `start` waits for backend construction before returning
    /// anyway.
    pub ready_timeout: Duration,
    /// Tick of the worker's idle wait; bounds shutdown wake latency.
    pub poll_interval: Duration,
    /// How long `shutdown` waits for the worker to finish the in-flight
    /// utterance before giving up on the join.
    pub join_timeout: Duration,
}

impl Default for VoiceEngineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 10,
            ready_timeout: Duration::from_secs(3),
            poll_interval: Duration::from_millis(200),
            join_timeout: Duration::from_secs(1),
        }
    }
}

enum WorkerMessage {
    Utterance(String),
    /// Unblocks the worker's timed wait during shutdown. Carries no work.
    Wake,
}

/// An explicitly owned speech queue. Construct with [`VoiceEngine::start`],
/// tear down with [`VoiceEngine::shutdown`] (also run on drop).
pub struct VoiceEngine {
    tx: SyncSender<WorkerMessage>,
    stopped: Arc<AtomicBool>,
    worker: Mutex<Option<WorkerHandle>>,
    join_timeout: Duration,
}

struct WorkerHandle {
    thread: JoinHandle<()>,
    done_rx: Receiver<()>,
}

impl VoiceEngine {
    /// Spawns the worker thread. The factory runs on that thread, exactly
    /// once, so the backend handle never exists outside it. Waits up to
    /// `config.ready_timeout` for construction to settle, then returns the
    /// engine whether or not a backend came up; without one, every utterance
    /// is dropped with a log line.
    pub fn start(config: VoiceEngineConfig, factory: SynthesizerFactory) -> Self {
        let (tx, rx) = mpsc::sync_channel(config.queue_capacity.max(1));
        let (ready_tx, ready_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();
        let stopped = Arc::new(AtomicBool::new(false));

        let poll_interval = config.poll_interval;
        let worker_stopped = stopped.clone();
        let spawned = thread::Builder::new()
            .name("voice-engine".into())
            .spawn(move || {
                worker_loop(rx, factory, worker_stopped, ready_tx, done_tx, poll_interval);
            });

        let worker = match spawned {
            Ok(thread) => {
                if ready_rx.recv_timeout(config.ready_timeout).is_err() {
                    warn!(
                        "speech backend still initializing after {:?}; continuing",
                        config.ready_timeout
                    );
                }
                Some(WorkerHandle { thread, done_rx })
            }
            Err(e) => {
                // No worker means no speech; the engine starts out stopped
                // and every speak call is a silent no-op.
                warn!("could not spawn speech worker: {e}; speech disabled");
                stopped.store(true, Ordering::Release);
                None
            }
        };

        Self {
            tx,
            stopped,
            worker: Mutex::new(worker),
            join_timeout: config.join_timeout,
        }
    }

    /// Starts the engine with default settings.
    pub fn with_default_config(factory: SynthesizerFactory) -> Self {
        Self::start(VoiceEngineConfig::default(), factory)
    }

    /// Queues text for speech. Returns immediately in all cases: after
    /// `shutdown` this is a silent no-op, and on a full queue the text is
    /// dropped with a log line rather than blocking the caller.
    pub fn speak(&self, text: impl Into<String>) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }
        match self.tx.try_send(WorkerMessage::Utterance(text.into())) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("speech queue full; dropping utterance");
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("speech worker gone; dropping utterance");
            }
        }
    }

    /// Stops accepting work, wakes the worker, and waits briefly for the
    /// in-flight utterance to finish. Idempotent; never hangs process exit.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        // Best effort: if the queue is full, the worker's timed wait notices
        // the stop flag within one poll interval anyway.
        let _ = self.tx.try_send(WorkerMessage::Wake);

        let handle = self.worker.lock().unwrap().take();
        if let Some(WorkerHandle { thread, done_rx }) = handle {
            match done_rx.recv_timeout(self.join_timeout) {
                Ok(()) => {
                    let _ = thread.join();
                }
                Err(_) => {
                    warn!(
                        "speech worker did not stop within {:?}; detaching",
                        self.join_timeout
                    );
                }
            }
        }
    }
}

impl Drop for VoiceEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(
    rx: Receiver<WorkerMessage>,
    factory: SynthesizerFactory,
    stopped: Arc<AtomicBool>,
    ready_tx: mpsc::Sender<()>,
    done_tx: mpsc::Sender<()>,
    poll_interval: Duration,
) {
    let mut synthesizer = match factory() {
        Ok(s) => Some(s),
        Err(e) => {
            warn!("{e}; speech disabled");
            None
        }
    };
    let _ = ready_tx.send(());

    while !stopped.load(Ordering::Acquire) {
        let message = match rx.recv_timeout(poll_interval) {
            Ok(m) => m,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let text = match message {
            WorkerMessage::Utterance(text) => text,
            WorkerMessage::Wake => continue,
        };

        if text.trim().is_empty() {
            continue;
        }
        let Some(synth) = synthesizer.as_mut() else {
            warn!("speech backend unavailable; dropping utterance");
            continue;
        };
        if let Err(e) = synth.speak(&text) {
            warn!("{e}");
        }
    }

    debug!("voice worker exiting");
    drop(synthesizer);
    let _ = done_tx.send(());
}
