/// Background channel playlist synchronization queue
use crate::{error::Result, services::PlaylistService};
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::{Mutex, Notify};
use vidshelf_core::ChannelPlaylistSnapshot;
use vidshelf_storage::sync::SyncReport;

#[derive(Debug, Clone)]
pub struct ChannelSyncJob {
    pub channel_id: String,
    pub snapshots: Vec<ChannelPlaylistSnapshot>,
}

pub struct ChannelSyncQueue {
    queue: Mutex<VecDeque<ChannelSyncJob>>,
    notify: Notify,
    playlists: Arc<PlaylistService>,
    workers: usize,
}

impl ChannelSyncQueue {
    pub fn new(playlists: Arc<PlaylistService>, workers: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            playlists,
            workers,
        }
    }

    /// Start worker tasks
    pub fn start(self: Arc<Self>) {
        for worker_id in 0..self.workers {
            let queue = Arc::clone(&self);
            tokio::spawn(async move {
                tracing::info!(worker_id, "Channel sync worker started");
                queue.worker_loop(worker_id).await;
            });
        }
    }

    /// Enqueue a sync job
    pub async fn enqueue(&self, job: ChannelSyncJob) {
        let mut queue = self.queue.lock().await;
        tracing::info!(
            channel_id = %job.channel_id,
            playlists = job.snapshots.len(),
            "Enqueued channel sync job"
        );
        queue.push_back(job);
        drop(queue);
        self.notify.notify_one();
    }

    /// Take the next job, if any
    pub async fn pop(&self) -> Option<ChannelSyncJob> {
        self.queue.lock().await.pop_front()
    }

    /// Run one job to completion
    pub async fn process(&self, job: &ChannelSyncJob) -> Result<SyncReport> {
        self.playlists
            .sync_channel(&job.channel_id, &job.snapshots)
            .await
    }

    /// Worker loop - processes jobs from the queue
    async fn worker_loop(&self, worker_id: usize) {
        loop {
            let Some(job) = self.pop().await else {
                self.notify.notified().await;
                continue;
            };

            match self.process(&job).await {
                Ok(report) => tracing::info!(
                    worker_id,
                    channel_id = %job.channel_id,
                    created = report.created,
                    updated = report.updated,
                    skipped = report.skipped,
                    deactivated = report.deactivated,
                    "Channel sync job completed"
                ),
                Err(e) => tracing::error!(
                    worker_id,
                    channel_id = %job.channel_id,
                    error = %e,
                    "Channel sync job failed"
                ),
            }
        }
    }

    /// Get queue length
    pub async fn queue_length(&self) -> usize {
        self.queue.lock().await.len()
    }
}
