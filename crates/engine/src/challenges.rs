//! Challenge tracking
//!
//! Each user carries a daily and a weekly challenge set, regenerated
//! lazily once expired. The template subset for a set is chosen by a
//! SHA-256-derived seed over (user id, period key), so regeneration for
//! a given user and day is reproducible. Sub-challenge completion is
//! exactly-once: the bonus XP for a challenge is granted the single
//! time its completed flag flips.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Sqlite};
use tracing::info;
use uuid::Uuid;

use crate::{curve, rewards};
use common::models::{ChallengeItem, ChallengePeriod, ChallengeSet, Module};
use common::{Error, Result};

/// Number of sub-challenges per generated set
const CHALLENGES_PER_SET: usize = 3;

/// A generatable challenge
struct ChallengeTemplate {
    id: &'static str,
    description: &'static str,
    module: Module,
    activity_type: Option<&'static str>,
    target: i64,
    xp_reward: i64,
}

const DAILY_TEMPLATES: &[ChallengeTemplate] = &[
    ChallengeTemplate {
        id: "daily_reading",
        description: "Complete 3 reading exercises",
        module: Module::Reading,
        activity_type: None,
        target: 3,
        xp_reward: 30,
    },
    ChallengeTemplate {
        id: "daily_writing",
        description: "Finish 2 writing activities",
        module: Module::Writing,
        activity_type: None,
        target: 2,
        xp_reward: 30,
    },
    ChallengeTemplate {
        id: "daily_listening",
        description: "Complete 2 listening sessions",
        module: Module::Listening,
        activity_type: Some("complete_session"),
        target: 2,
        xp_reward: 25,
    },
    ChallengeTemplate {
        id: "daily_speaking",
        description: "Hold 1 conversation practice",
        module: Module::Speaking,
        activity_type: Some("conversation"),
        target: 1,
        xp_reward: 25,
    },
    ChallengeTemplate {
        id: "daily_flashcards",
        description: "Review 10 flashcards",
        module: Module::Vocabulary,
        activity_type: Some("flashcard_review"),
        target: 10,
        xp_reward: 20,
    },
    ChallengeTemplate {
        id: "daily_grammar",
        description: "Complete 3 grammar exercises",
        module: Module::Grammar,
        activity_type: Some("complete_exercise"),
        target: 3,
        xp_reward: 25,
    },
    ChallengeTemplate {
        id: "daily_games",
        description: "Play 2 language games",
        module: Module::Games,
        activity_type: None,
        target: 2,
        xp_reward: 15,
    },
];

const WEEKLY_TEMPLATES: &[ChallengeTemplate] = &[
    ChallengeTemplate {
        id: "weekly_reading",
        description: "Complete 15 reading activities this week",
        module: Module::Reading,
        activity_type: None,
        target: 15,
        xp_reward: 100,
    },
    ChallengeTemplate {
        id: "weekly_writing",
        description: "Submit 3 essays this week",
        module: Module::Writing,
        activity_type: Some("submit_essay"),
        target: 3,
        xp_reward: 120,
    },
    ChallengeTemplate {
        id: "weekly_listening",
        description: "Complete 10 listening activities this week",
        module: Module::Listening,
        activity_type: None,
        target: 10,
        xp_reward: 100,
    },
    ChallengeTemplate {
        id: "weekly_speaking",
        description: "Complete 8 speaking sessions this week",
        module: Module::Speaking,
        activity_type: None,
        target: 8,
        xp_reward: 110,
    },
    ChallengeTemplate {
        id: "weekly_vocabulary",
        description: "Review 50 flashcards this week",
        module: Module::Vocabulary,
        activity_type: Some("flashcard_review"),
        target: 50,
        xp_reward: 90,
    },
    ChallengeTemplate {
        id: "weekly_grammar",
        description: "Complete 12 grammar activities this week",
        module: Module::Grammar,
        activity_type: None,
        target: 12,
        xp_reward: 100,
    },
];

/// A challenge completed by the current activity
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedChallenge {
    pub id: String,
    pub description: String,
    pub period: ChallengePeriod,
    pub xp_reward: i64,
}

/// Result of challenge bookkeeping for one activity
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeOutcome {
    pub daily_challenges_updated: u64,
    pub weekly_challenges_updated: u64,
    pub completed_challenges: Vec<CompletedChallenge>,
}

/// Maintains per-user daily and weekly challenge sets
pub struct ChallengeTracker {
    pool: Pool<Sqlite>,
}

impl ChallengeTracker {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Apply one activity to the user's current challenge sets.
    ///
    /// Regenerates expired sets first, then increments matching
    /// sub-challenges and grants bonuses for any that completed.
    pub async fn update_progress(
        &self,
        user_id: Uuid,
        module: Module,
        activity_type: &str,
        metadata: &Value,
    ) -> Result<ChallengeOutcome> {
        let now = Utc::now();
        let amount = rewards::progress_amount(metadata);
        let mut outcome = ChallengeOutcome::default();

        for period in [ChallengePeriod::Daily, ChallengePeriod::Weekly] {
            self.ensure_current_set(user_id, period, now).await?;

            let updated = db::challenges::increment_progress(
                &self.pool, user_id, period, module, activity_type, amount,
            )
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
            match period {
                ChallengePeriod::Daily => outcome.daily_challenges_updated = updated,
                ChallengePeriod::Weekly => outcome.weekly_challenges_updated = updated,
            }

            let completed = db::challenges::take_completed(&self.pool, user_id, period)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
            for item in completed {
                info!(
                    user_id = %user_id,
                    challenge = %item.id,
                    %period,
                    xp_reward = item.xp_reward,
                    "challenge completed"
                );
                db::profiles::add_xp(&self.pool, user_id, item.xp_reward)
                    .await
                    .map_err(|e| Error::Database(e.to_string()))?;
                outcome.completed_challenges.push(CompletedChallenge {
                    id: item.id,
                    description: item.description,
                    period,
                    xp_reward: item.xp_reward,
                });
            }
        }

        // Bonus XP shifts the cached level
        if !outcome.completed_challenges.is_empty() {
            let experience = db::profiles::experience(&self.pool, user_id)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
            let info = curve::level_for_experience(experience);
            db::profiles::set_level(&self.pool, user_id, info.level, info.xp_to_next)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
        }

        Ok(outcome)
    }

    /// Current daily and weekly sets, regenerating any that expired
    pub async fn current_sets(&self, user_id: Uuid) -> Result<Vec<ChallengeSet>> {
        let now = Utc::now();
        let mut sets = Vec::with_capacity(2);
        for period in [ChallengePeriod::Daily, ChallengePeriod::Weekly] {
            sets.push(self.ensure_current_set(user_id, period, now).await?);
        }
        Ok(sets)
    }

    async fn ensure_current_set(
        &self,
        user_id: Uuid,
        period: ChallengePeriod,
        now: DateTime<Utc>,
    ) -> Result<ChallengeSet> {
        let existing = db::challenges::get_set(&self.pool, user_id, period)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        if let Some(set) = existing {
            if set.expires_at > now {
                return Ok(set);
            }
        }

        let set = generate_set(user_id, period, now);
        db::challenges::replace_set(&self.pool, user_id, &set)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;
        info!(user_id = %user_id, %period, expires_at = %set.expires_at, "challenge set regenerated");
        Ok(set)
    }
}

/// Generate a fresh challenge set for (user, period) at `now`.
///
/// Template selection is seeded, not random: the same user and period
/// key always produce the same subset.
fn generate_set(user_id: Uuid, period: ChallengePeriod, now: DateTime<Utc>) -> ChallengeSet {
    let templates = match period {
        ChallengePeriod::Daily => DAILY_TEMPLATES,
        ChallengePeriod::Weekly => WEEKLY_TEMPLATES,
    };

    let seed = seed_for(user_id, &period_key(period, now));
    let challenges = pick_templates(templates, &seed, CHALLENGES_PER_SET)
        .into_iter()
        .map(|t| ChallengeItem {
            id: t.id.to_string(),
            description: t.description.to_string(),
            module: t.module,
            activity_type: t.activity_type.map(str::to_string),
            target: t.target,
            progress: 0,
            completed: false,
            xp_reward: t.xp_reward,
        })
        .collect();

    ChallengeSet {
        period,
        refreshed_at: now,
        expires_at: expiry_for(period, now),
        challenges,
    }
}

/// Stable key naming the period instance: the UTC date for daily sets,
/// the ISO year-week for weekly ones
fn period_key(period: ChallengePeriod, now: DateTime<Utc>) -> String {
    match period {
        ChallengePeriod::Daily => now.date_naive().to_string(),
        ChallengePeriod::Weekly => {
            let week = now.iso_week();
            format!("{}-W{:02}", week.year(), week.week())
        }
    }
}

fn seed_for(user_id: Uuid, period_key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b":");
    hasher.update(period_key.as_bytes());
    hasher.finalize().into()
}

/// Pick `count` distinct templates using successive seed words
fn pick_templates<'a>(
    templates: &'a [ChallengeTemplate],
    seed: &[u8; 32],
    count: usize,
) -> Vec<&'a ChallengeTemplate> {
    let mut remaining: Vec<&ChallengeTemplate> = templates.iter().collect();
    let mut picked = Vec::with_capacity(count);

    for chunk in seed.chunks_exact(8) {
        if picked.len() == count || remaining.is_empty() {
            break;
        }
        let word = u64::from_be_bytes(chunk.try_into().unwrap_or([0; 8]));
        let idx = (word % remaining.len() as u64) as usize;
        picked.push(remaining.remove(idx));
    }

    picked
}

/// When a set generated at `now` stops being current: the next UTC
/// midnight for daily sets, the next Monday UTC midnight for weekly
fn expiry_for(period: ChallengePeriod, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let expiry_date = match period {
        ChallengePeriod::Daily => today + Duration::days(1),
        ChallengePeriod::Weekly => {
            let days_ahead = 7 - i64::from(today.weekday().num_days_from_monday());
            today + Duration::days(days_ahead)
        }
    };
    midnight_utc(expiry_date)
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}
