//! Background brand voice generation.
//!
//! A job record is written as `pending` before the request is queued, so a poll
//! never observes an id the store does not know. A single worker task drains the
//! queue and moves each record through `running` to `succeeded` or `failed`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::brand_voice::generator::generate_brand_voice;
use crate::errors::AppError;
use crate::llm_client::CompletionProvider;
use crate::models::job::GenerationJob;
use crate::models::profile::BusinessProfile;
use crate::store::{Repository, StoreError};

const QUEUE_CAPACITY: usize = 64;

/// Recorded on jobs a previous process left unfinished.
pub const INTERRUPTED_MESSAGE: &str = "Generation was interrupted by a server restart";
const QUEUE_CLOSED_MESSAGE: &str = "Generation queue is not running";

struct JobRequest {
    job_id: Uuid,
    profile: BusinessProfile,
}

/// Handle for submitting generation jobs. Cheap to clone; all clones feed the same worker.
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<JobRequest>,
    store: Arc<dyn Repository>,
}

impl JobQueue {
    /// Spawns the worker task. Must be called from within a tokio runtime.
    pub fn start(llm: Arc<dyn CompletionProvider>, store: Arc<dyn Repository>) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(run_worker(receiver, llm, Arc::clone(&store)));
        Self { sender, store }
    }

    /// Persists a pending job for `user_id` and queues it. If the queue is closed
    /// the record is failed immediately rather than left pending.
    pub async fn submit(
        &self,
        user_id: &str,
        profile: BusinessProfile,
    ) -> Result<GenerationJob, AppError> {
        let mut job = GenerationJob::new(user_id);
        self.store.insert_job(&job).await?;

        let request = JobRequest {
            job_id: job.id,
            profile,
        };
        if self.sender.send(request).await.is_err() {
            error!("Job {} could not be queued: worker is gone", job.id);
            job.fail(QUEUE_CLOSED_MESSAGE);
            self.store.update_job(&job).await?;
        } else {
            info!("Queued brand voice job {} for user {user_id}", job.id);
        }

        Ok(job)
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<JobRequest>,
    llm: Arc<dyn CompletionProvider>,
    store: Arc<dyn Repository>,
) {
    while let Some(request) = receiver.recv().await {
        let job_id = request.job_id;
        if let Err(e) = process(request, llm.as_ref(), store.as_ref()).await {
            error!("Job {job_id} could not be recorded: {e}");
        }
    }
    info!("Generation queue closed");
}

async fn process(
    request: JobRequest,
    llm: &dyn CompletionProvider,
    store: &dyn Repository,
) -> Result<(), StoreError> {
    let Some(mut job) = store.get_job(request.job_id).await? else {
        warn!("Job {} vanished before it ran", request.job_id);
        return Ok(());
    };
    if job.status.is_terminal() {
        return Ok(());
    }

    job.start();
    store.update_job(&job).await?;

    let outcome = match generate_brand_voice(llm, &request.profile).await {
        Ok(voice) => store
            .put_brand_voice(&job.user_id, &voice)
            .await
            .map(|_| voice)
            .map_err(AppError::from),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(voice) => {
            info!("Job {} succeeded", job.id);
            job.succeed(voice);
        }
        Err(e) => {
            warn!("Job {} failed: {e}", job.id);
            job.fail(e.public_message());
        }
    }
    store.update_job(&job).await
}
