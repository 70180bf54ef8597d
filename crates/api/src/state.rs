//! Application state

use common::Config;
use engine::{ActivityRecorder, ChallengeTracker};
use sqlx::{Pool, Sqlite};

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub pool: Pool<Sqlite>,
    pub recorder: ActivityRecorder,
    pub tracker: ChallengeTracker,
}

impl AppState {
    pub fn new(config: Config, pool: Pool<Sqlite>) -> Self {
        let recorder = ActivityRecorder::new(pool.clone());
        let tracker = ChallengeTracker::new(pool.clone());
        Self {
            config,
            pool,
            recorder,
            tracker,
        }
    }
}
