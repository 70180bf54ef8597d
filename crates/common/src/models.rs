//! Domain models

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A learning feature area that can award XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Reading,
    Writing,
    Listening,
    Speaking,
    Vocabulary,
    Grammar,
    Games,
}

impl Module {
    pub const ALL: [Module; 7] = [
        Module::Reading,
        Module::Writing,
        Module::Listening,
        Module::Speaking,
        Module::Vocabulary,
        Module::Grammar,
        Module::Games,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Reading => "reading",
            Module::Writing => "writing",
            Module::Listening => "listening",
            Module::Speaking => "speaking",
            Module::Vocabulary => "vocabulary",
            Module::Grammar => "grammar",
            Module::Games => "games",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Module::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consecutive-day activity streak.
///
/// Calendar-day boundaries are evaluated in UTC.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Streak {
    pub current: i32,
    pub longest: i32,
    pub last_activity: Option<DateTime<Utc>>,
}

/// Aggregate counters carried on a profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileStats {
    pub total_xp: i64,
    pub active_days: i32,
    pub module_activity: BTreeMap<Module, i64>,
}

/// An unlocked achievement or badge on a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnlockRecord {
    pub id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// A user's gamification profile (one per user, unique on user id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamificationProfile {
    pub user_id: Uuid,
    pub level: i32,
    pub experience: i64,
    /// Cached for display; always recomputable from `experience`
    pub experience_to_next_level: i64,
    pub streak: Streak,
    pub achievements: Vec<UnlockRecord>,
    pub badges: Vec<UnlockRecord>,
    pub stats: ProfileStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One recorded action in the append-only audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub user_id: Uuid,
    pub module: Module,
    pub activity_type: String,
    pub xp_earned: i64,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Grouping for achievement definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Milestone,
    Streak,
    Mastery,
    Special,
}

/// Badge tiers, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// Challenge set cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengePeriod {
    Daily,
    Weekly,
}

impl ChallengePeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengePeriod::Daily => "daily",
            ChallengePeriod::Weekly => "weekly",
        }
    }
}

impl fmt::Display for ChallengePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single target-based task within a challenge set.
///
/// `progress` only increases and is capped at `target`; `completed`
/// transitions false -> true exactly once per set lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeItem {
    pub id: String,
    pub description: String,
    pub module: Module,
    /// Restricts matching to one activity type; `None` matches the whole module
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    pub target: i64,
    pub progress: i64,
    pub completed: bool,
    pub xp_reward: i64,
}

/// A user's current daily or weekly challenge set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeSet {
    pub period: ChallengePeriod,
    pub refreshed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub challenges: Vec<ChallengeItem>,
}

/// Leaderboard time window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardPeriod {
    Week,
    Month,
    AllTime,
}

impl LeaderboardPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "week" => Some(LeaderboardPeriod::Week),
            "month" => Some(LeaderboardPeriod::Month),
            "all" => Some(LeaderboardPeriod::AllTime),
            _ => None,
        }
    }
}

/// What a leaderboard ranks by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardCategory {
    Xp,
    Level,
    Streak,
}

impl LeaderboardCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "xp" => Some(LeaderboardCategory::Xp),
            "level" => Some(LeaderboardCategory::Level),
            "streak" => Some(LeaderboardCategory::Streak),
            _ => None,
        }
    }
}

/// Leaderboard entry.
///
/// Ranks are dense and 1-based; ties share a rank and are ordered by
/// user id for deterministic output. Display names live with the
/// surrounding application's user store and are joined by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: i32,
    pub user_id: Uuid,
    pub value: i64,
}
