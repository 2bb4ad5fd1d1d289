use std::sync::Arc;

use crate::config::Config;
use crate::email::Mailer;
use crate::files::FileStore;
use crate::rate_limit::SubmissionRateLimiter;
use crate::sheets::SheetStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub sheets: Arc<dyn SheetStore>,
    pub files: Arc<dyn FileStore>,
    pub mailer: Option<Arc<dyn Mailer>>,
    pub submission_limiter: SubmissionRateLimiter,
}

impl AppState {
    pub fn new(
        config: Config,
        sheets: Arc<dyn SheetStore>,
        files: Arc<dyn FileStore>,
        mailer: Option<Arc<dyn Mailer>>,
    ) -> Self {
        Self {
            config,
            sheets,
            files,
            mailer,
            submission_limiter: SubmissionRateLimiter::new(),
        }
    }
}
