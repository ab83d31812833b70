//! Background simulation worker thread.
//!
//! Owns the engine so the GUI never blocks on a sweep. The control side
//! sends instruction batches (fire-and-forget); the worker sends back a
//! `FrameReport` after every batch or frame that swept or changed the run
//! state. Reports queue up to [`REPORT_QUEUE`]; past that the oldest is
//! evicted. Frames themselves travel through the handed-off surface, not
//! through this channel.
//!
//! Loop shape: at the top of every iteration the worker checks whether the
//! engine is running. Stopped, it blocks on the request channel with no
//! background cost. Running, it waits for requests only until the next
//! frame is due, then performs exactly one sweep + render.

use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::command::{Batch, Instruction};
use crate::config::EngineConfig;
use crate::engine::SimulationEngine;

/// Reports kept for a control side that is not polling.
pub const REPORT_QUEUE: usize = 64;

/// Per-sweep statistics sent from worker to GUI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Total sweeps since the handoff.
    pub sweeps: u64,
    pub magnetization: f64,
    pub acceptance_ratio: f64,
    pub beta: f64,
    /// Whether the animation is still running after this sweep.
    pub running: bool,
}

impl FrameReport {
    fn from_engine(engine: &SimulationEngine) -> Self {
        Self {
            sweeps: engine.sweeps(),
            magnetization: engine.magnetization(),
            acceptance_ratio: engine.last_stats().acceptance_ratio(),
            beta: engine.beta(),
            running: engine.is_running(),
        }
    }
}

/// Handle to communicate with the background worker.
pub struct SimWorker {
    tx: Option<Sender<Batch>>,
    rx: Receiver<FrameReport>,
    handle: Option<JoinHandle<()>>,
}

impl SimWorker {
    /// Spawn the background worker thread.
    pub fn spawn(config: EngineConfig) -> Self {
        let (req_tx, req_rx) = crossbeam_channel::unbounded::<Batch>();
        let (resp_tx, resp_rx) = crossbeam_channel::bounded::<FrameReport>(REPORT_QUEUE);
        let stale = resp_rx.clone();

        let handle = thread::Builder::new()
            .name("xy-sim-worker".into())
            .spawn(move || WorkerLoop::new(config, req_rx, resp_tx, stale).run())
            .map_err(|err| log::error!("failed to spawn simulation worker: {}", err))
            .ok();

        SimWorker {
            tx: Some(req_tx),
            rx: resp_rx,
            handle,
        }
    }

    /// Send a batch (non-blocking). Dropped silently if the worker is gone.
    pub fn send(&self, batch: Batch) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(batch);
        }
    }

    /// Try to receive a report (non-blocking).
    pub fn try_recv(&self) -> Option<FrameReport> {
        self.rx.try_recv().ok()
    }

    /// Receiving end for callers that want to block or select.
    pub fn reports(&self) -> &Receiver<FrameReport> {
        &self.rx
    }
}

impl Drop for SimWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the loop.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

struct WorkerLoop {
    config: EngineConfig,
    engine: Option<SimulationEngine>,
    requests: Receiver<Batch>,
    reports: Sender<FrameReport>,
    stale: Receiver<FrameReport>,
}

impl WorkerLoop {
    fn new(
        config: EngineConfig,
        requests: Receiver<Batch>,
        reports: Sender<FrameReport>,
        stale: Receiver<FrameReport>,
    ) -> Self {
        Self {
            config,
            engine: None,
            requests,
            reports,
            stale,
        }
    }

    /// Queue a report, evicting the oldest one if the control side is behind.
    fn publish(&self, mut report: FrameReport) {
        loop {
            match self.reports.try_send(report) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    let _ = self.stale.try_recv();
                    report = back;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    fn run(mut self) {
        let mut next_frame = Instant::now();
        loop {
            let running = self.engine.as_ref().is_some_and(|e| e.is_running());

            if !running {
                match self.requests.recv() {
                    Ok(batch) => {
                        self.execute(batch);
                        next_frame = Instant::now();
                    }
                    Err(_) => break,
                }
                continue;
            }

            match self.requests.recv_deadline(next_frame) {
                Ok(batch) => self.execute(batch),
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(engine) = self.engine.as_mut() {
                        if let Some(stats) = engine.frame() {
                            log::trace!(
                                "frame {}: accepted {}/{}",
                                engine.sweeps(),
                                stats.accepted,
                                stats.attempted
                            );
                            let report = FrameReport::from_engine(engine);
                            self.publish(report);
                        }
                    }
                    // No catch-up bursts: a late frame pushes the schedule back.
                    next_frame = (next_frame + self.config.frame_interval).max(Instant::now());
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        log::debug!("simulation worker exiting");
    }

    fn execute(&mut self, batch: Batch) {
        let sweeps_before = self.engine.as_ref().map_or(0, |e| e.sweeps());
        let running_before = self.engine.as_ref().is_some_and(|e| e.is_running());

        for instruction in batch {
            match instruction {
                Instruction::Handoff(handoff) => {
                    match SimulationEngine::from_handoff(handoff, &self.config) {
                        Ok(mut engine) => {
                            if self.engine.is_some() {
                                log::debug!("replacing engine on second handoff");
                            }
                            log::debug!("surface handoff, lattice {}", engine.size());
                            engine.initialize_data();
                            engine.render();
                            self.engine = Some(engine);
                        }
                        Err(err) => log::warn!("rejecting surface handoff: {}", err),
                    }
                }
                other => match self.engine.as_mut() {
                    Some(engine) => engine.apply(other),
                    None => log::debug!("dropping {:?} received before handoff", other),
                },
            }
        }

        if let Some(engine) = &self.engine {
            if engine.sweeps() > sweeps_before || engine.is_running() != running_before {
                self.publish(FrameReport::from_engine(engine));
            }
        }
    }
}
