// THEORY:
// `ParallelPipeline` watches several regions of the same stream at once. Each
// region gets its own `MotionPipeline`, and therefore its own background model;
// the pipelines share nothing but a read-only handle to the current frame.
//
// Key architectural principles:
// 1.  **Owned, Not Shared**: Pipelines are dealt round-robin to a fixed pool of
//     worker tasks at construction and never move again. A background model has
//     exactly one writer for its whole life, so no locks are needed around it.
// 2.  **Bounded Pool**: The pool has `min(regions, cpus)` workers. A worker that
//     owns several pipelines runs them one after another for each frame.
// 3.  **Ordered Fan-In**: Every frame is broadcast to every worker over FIFO
//     channels, so each pipeline sees frames in submission order. Results come
//     back on one-shot channels and are re-assembled in region order.

use crate::config::MotionConfig;
use crate::core_modules::detection::{DetectionResult, Timestamp};
use crate::core_modules::frame::Frame;
use crate::error::{ConfigurationError, MotionError};
use crate::pipeline::MotionPipeline;
use futures::future::join_all;
use log::debug;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

type RegionOutcome = (usize, Result<DetectionResult, MotionError>);

#[derive(Debug, Error)]
pub enum ParallelError {
    #[error("a detection worker stopped before answering")]
    WorkerGone,
}

struct FrameTask {
    frame: Arc<Frame>,
    timestamp: Timestamp,
    result_sender: oneshot::Sender<Vec<RegionOutcome>>,
}

/// Several independent `MotionPipeline`s driven concurrently over one stream.
pub struct ParallelPipeline {
    task_senders: Vec<mpsc::UnboundedSender<FrameTask>>,
    workers: Vec<JoinHandle<()>>,
    region_count: usize,
}

impl ParallelPipeline {
    /// Validates every configuration and spawns the worker pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(configs: Vec<MotionConfig>) -> Result<Self, ConfigurationError> {
        let region_count = configs.len();
        let worker_count = region_count.min(num_cpus::get()).max(1);

        let mut assignments: Vec<Vec<(usize, MotionPipeline)>> = (0..worker_count).map(|_| Vec::new()).collect();
        for (index, config) in configs.into_iter().enumerate() {
            assignments[index % worker_count].push((index, MotionPipeline::new(config)?));
        }

        let mut task_senders = Vec::with_capacity(worker_count);
        let mut workers = Vec::with_capacity(worker_count);
        for (worker_id, mut pipelines) in assignments.into_iter().enumerate() {
            let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<FrameTask>();
            let worker = tokio::spawn(async move {
                while let Some(task) = task_receiver.recv().await {
                    let outcomes: Vec<RegionOutcome> = pipelines
                        .iter_mut()
                        .map(|(index, pipeline)| (*index, pipeline.process(&task.frame, task.timestamp)))
                        .collect();
                    let _ = task.result_sender.send(outcomes);
                }
                debug!("detection worker {worker_id} shutting down");
            });
            task_senders.push(task_sender);
            workers.push(worker);
        }

        Ok(Self {
            task_senders,
            workers,
            region_count,
        })
    }

    pub fn region_count(&self) -> usize {
        self.region_count
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Runs `frame` through every region's pipeline. The returned vector holds
    /// one outcome per region, in the order the configurations were given.
    pub async fn process_frame(
        &mut self,
        frame: Arc<Frame>,
        timestamp: Timestamp,
    ) -> Result<Vec<Result<DetectionResult, MotionError>>, ParallelError> {
        let mut receivers = Vec::with_capacity(self.task_senders.len());
        for task_sender in &self.task_senders {
            let (result_sender, result_receiver) = oneshot::channel();
            task_sender
                .send(FrameTask {
                    frame: Arc::clone(&frame),
                    timestamp,
                    result_sender,
                })
                .map_err(|_| ParallelError::WorkerGone)?;
            receivers.push(result_receiver);
        }

        let mut slots: Vec<Option<Result<DetectionResult, MotionError>>> =
            (0..self.region_count).map(|_| None).collect();
        for outcome in join_all(receivers).await {
            for (index, result) in outcome.map_err(|_| ParallelError::WorkerGone)? {
                slots[index] = Some(result);
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.ok_or(ParallelError::WorkerGone))
            .collect()
    }

    /// Closes the task channels and waits for every worker to finish.
    pub async fn shutdown(self) {
        drop(self.task_senders);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}
