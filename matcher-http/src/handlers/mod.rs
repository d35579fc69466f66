use resume_matcher::ResumeMatcher;

pub mod health;
pub mod matching;
pub mod metrics;
pub mod resumes;

pub struct AppState {
    pub matcher: ResumeMatcher,
    pub start_time: std::time::Instant,
    /// Outcome of index provisioning at startup; `false` means the service
    /// is running degraded and index calls may fail.
    pub index_ready: bool,
}

pub use health::health;
pub use matching::match_job;
pub use metrics::metrics_handler;
pub use resumes::upload_resume;
