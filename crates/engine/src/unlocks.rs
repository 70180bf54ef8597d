//! Unlock evaluation
//!
//! Walks the catalog in order against a post-update snapshot. The
//! database's unique unlock key decides "newly unlocked", so evaluating
//! twice (retry, concurrent request) never re-grants a reward.

use chrono::Utc;
use sqlx::{Pool, Sqlite};
use tracing::info;
use uuid::Uuid;

use crate::catalog::{AchievementDef, BadgeDef, ProfileSnapshot, ACHIEVEMENTS, BADGES};
use common::models::Module;
use common::{Error, Result};

/// Unlocks produced by one evaluation pass
#[derive(Debug, Default)]
pub struct EvaluatedUnlocks {
    pub achievements: Vec<&'static AchievementDef>,
    pub badges: Vec<&'static BadgeDef>,
    /// Total reward XP granted for the new unlocks
    pub xp_granted: i64,
}

/// Evaluates and grants achievement/badge unlocks
pub struct UnlockEvaluator {
    pool: Pool<Sqlite>,
}

impl UnlockEvaluator {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Evaluate every definition not yet unlocked for this user against
    /// the snapshot; grant rewards for new unlocks and return them.
    pub async fn evaluate(
        &self,
        user_id: Uuid,
        module: Module,
        snapshot: &ProfileSnapshot,
    ) -> Result<EvaluatedUnlocks> {
        let now = Utc::now();
        let mut unlocked = EvaluatedUnlocks::default();

        for def in ACHIEVEMENTS {
            if !def.requirement.applies_to(module) || !def.requirement.is_met(snapshot) {
                continue;
            }
            let newly = db::unlocks::insert_achievement(&self.pool, user_id, def.id, now)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
            if newly {
                info!(user_id = %user_id, achievement = def.id, "achievement unlocked");
                self.grant(user_id, def.xp_reward).await?;
                unlocked.xp_granted += def.xp_reward;
                unlocked.achievements.push(def);
            }
        }

        for def in BADGES {
            if !def.requirement.applies_to(module) || !def.requirement.is_met(snapshot) {
                continue;
            }
            let newly = db::unlocks::insert_badge(&self.pool, user_id, def.id, now)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
            if newly {
                info!(user_id = %user_id, badge = def.id, "badge unlocked");
                self.grant(user_id, def.xp_reward).await?;
                unlocked.xp_granted += def.xp_reward;
                unlocked.badges.push(def);
            }
        }

        Ok(unlocked)
    }

    async fn grant(&self, user_id: Uuid, xp_reward: i64) -> Result<()> {
        if xp_reward > 0 {
            db::profiles::add_xp(&self.pool, user_id, xp_reward)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
        }
        Ok(())
    }
}
