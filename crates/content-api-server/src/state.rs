use std::sync::Arc;

use crate::config::Settings;
use crate::lifecycle::ReadinessHandle;
use crate::middleware::ResponseCipher;
use crate::security::RateLimiter;
use crate::session::SessionStore;

/// Application state shared across middleware and handlers.
///
/// The pool itself stays out of here: the session store and schema manager
/// hold their own clones, and the lifecycle owns probe/close.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub sessions: SessionStore,
    pub cipher: Arc<ResponseCipher>,
    pub limiter: Arc<RateLimiter>,
    pub readiness: ReadinessHandle,
}
