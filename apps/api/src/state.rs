use std::sync::Arc;

use reqwest::Client;

use crate::config::Config;
use crate::jobs::JobQueue;
use crate::llm_client::CompletionProvider;
use crate::store::Repository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Every LLM call goes through this provider. Production: `LlmClient`.
    pub llm: Arc<dyn CompletionProvider>,
    /// Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn Repository>,
    pub jobs: JobQueue,
    /// Plain HTTP client for fetching websites to analyze.
    pub http: Client,
    pub config: Config,
}

impl AppState {
    /// Wires the state and starts the background job worker.
    pub fn new(
        llm: Arc<dyn CompletionProvider>,
        store: Arc<dyn Repository>,
        http: Client,
        config: Config,
    ) -> Self {
        let jobs = JobQueue::start(Arc::clone(&llm), Arc::clone(&store));
        Self {
            llm,
            store,
            jobs,
            http,
            config,
        }
    }
}
