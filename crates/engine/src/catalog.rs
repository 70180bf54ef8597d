//! Achievement and badge catalog
//!
//! Static, versioned definitions. Requirements are a tagged enum
//! evaluated by one dispatch function against a post-update profile
//! snapshot; array order is the evaluation order, so XP totals are
//! reproducible.

use std::collections::BTreeMap;

use common::models::{AchievementCategory, BadgeTier, Module};

/// Profile state a requirement is evaluated against, captured after the
/// triggering activity has been applied
#[derive(Debug, Clone, Default)]
pub struct ProfileSnapshot {
    pub level: i32,
    pub total_xp: i64,
    pub streak_current: i32,
    pub total_activities: i64,
    pub module_activities: BTreeMap<Module, i64>,
}

impl ProfileSnapshot {
    pub fn module_count(&self, module: Module) -> i64 {
        self.module_activities.get(&module).copied().unwrap_or(0)
    }
}

/// Unlock condition, keyed by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Total recorded activities across all modules
    TotalActivities { count: i64 },
    /// Recorded activities within one module
    ModuleActivities { module: Module, count: i64 },
    /// Current streak length in days
    StreakDays { days: i32 },
    /// Level reached
    LevelReached { level: i32 },
    /// Cumulative XP earned
    TotalXp { amount: i64 },
}

impl Requirement {
    /// Module-scoped requirements only evaluate when the triggering
    /// module matches; everything else applies across all modules
    pub fn applies_to(&self, module: Module) -> bool {
        match self {
            Requirement::ModuleActivities { module: m, .. } => *m == module,
            _ => true,
        }
    }

    pub fn is_met(&self, snapshot: &ProfileSnapshot) -> bool {
        let (current, target) = self.progress(snapshot);
        current >= target
    }

    /// (current, target) pair for progress display
    pub fn progress(&self, snapshot: &ProfileSnapshot) -> (i64, i64) {
        match *self {
            Requirement::TotalActivities { count } => (snapshot.total_activities, count),
            Requirement::ModuleActivities { module, count } => {
                (snapshot.module_count(module), count)
            }
            Requirement::StreakDays { days } => (i64::from(snapshot.streak_current), i64::from(days)),
            Requirement::LevelReached { level } => (i64::from(snapshot.level), i64::from(level)),
            Requirement::TotalXp { amount } => (snapshot.total_xp, amount),
        }
    }
}

/// An unlockable achievement
#[derive(Debug, Clone, Copy)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: AchievementCategory,
    pub icon: &'static str,
    pub xp_reward: i64,
    pub requirement: Requirement,
}

/// An unlockable tiered badge
#[derive(Debug, Clone, Copy)]
pub struct BadgeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub tier: BadgeTier,
    pub icon: &'static str,
    pub xp_reward: i64,
    pub requirement: Requirement,
}

/// Achievement catalog, in evaluation order
pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        id: "first_steps",
        name: "First Steps",
        description: "Complete your first activity",
        category: AchievementCategory::Milestone,
        icon: "🐣",
        xp_reward: 10,
        requirement: Requirement::TotalActivities { count: 1 },
    },
    AchievementDef {
        id: "warming_up",
        name: "Warming Up",
        description: "Complete 10 activities",
        category: AchievementCategory::Milestone,
        icon: "🔥",
        xp_reward: 20,
        requirement: Requirement::TotalActivities { count: 10 },
    },
    AchievementDef {
        id: "dedicated_learner",
        name: "Dedicated Learner",
        description: "Complete 50 activities",
        category: AchievementCategory::Milestone,
        icon: "📚",
        xp_reward: 50,
        requirement: Requirement::TotalActivities { count: 50 },
    },
    AchievementDef {
        id: "century_club",
        name: "Century Club",
        description: "Complete 100 activities",
        category: AchievementCategory::Milestone,
        icon: "💯",
        xp_reward: 100,
        requirement: Requirement::TotalActivities { count: 100 },
    },
    AchievementDef {
        id: "week_streak",
        name: "Week Streak",
        description: "Practice 7 days in a row",
        category: AchievementCategory::Streak,
        icon: "📅",
        xp_reward: 30,
        requirement: Requirement::StreakDays { days: 7 },
    },
    AchievementDef {
        id: "month_streak",
        name: "Unstoppable",
        description: "Practice 30 days in a row",
        category: AchievementCategory::Streak,
        icon: "🚀",
        xp_reward: 150,
        requirement: Requirement::StreakDays { days: 30 },
    },
    AchievementDef {
        id: "bookworm",
        name: "Bookworm",
        description: "Complete 25 reading activities",
        category: AchievementCategory::Mastery,
        icon: "🐛",
        xp_reward: 40,
        requirement: Requirement::ModuleActivities {
            module: Module::Reading,
            count: 25,
        },
    },
    AchievementDef {
        id: "wordsmith",
        name: "Wordsmith",
        description: "Complete 25 writing activities",
        category: AchievementCategory::Mastery,
        icon: "✍️",
        xp_reward: 40,
        requirement: Requirement::ModuleActivities {
            module: Module::Writing,
            count: 25,
        },
    },
    AchievementDef {
        id: "keen_listener",
        name: "Keen Listener",
        description: "Complete 25 listening activities",
        category: AchievementCategory::Mastery,
        icon: "🎧",
        xp_reward: 40,
        requirement: Requirement::ModuleActivities {
            module: Module::Listening,
            count: 25,
        },
    },
    AchievementDef {
        id: "conversationalist",
        name: "Conversationalist",
        description: "Complete 25 speaking activities",
        category: AchievementCategory::Mastery,
        icon: "🗣️",
        xp_reward: 40,
        requirement: Requirement::ModuleActivities {
            module: Module::Speaking,
            count: 25,
        },
    },
    AchievementDef {
        id: "lexicon_builder",
        name: "Lexicon Builder",
        description: "Complete 50 vocabulary activities",
        category: AchievementCategory::Mastery,
        icon: "📖",
        xp_reward: 40,
        requirement: Requirement::ModuleActivities {
            module: Module::Vocabulary,
            count: 50,
        },
    },
    AchievementDef {
        id: "grammar_enthusiast",
        name: "Grammar Enthusiast",
        description: "Complete 25 grammar activities",
        category: AchievementCategory::Mastery,
        icon: "🧩",
        xp_reward: 40,
        requirement: Requirement::ModuleActivities {
            module: Module::Grammar,
            count: 25,
        },
    },
    AchievementDef {
        id: "level_5",
        name: "Rising Star",
        description: "Reach level 5",
        category: AchievementCategory::Special,
        icon: "⭐",
        xp_reward: 50,
        requirement: Requirement::LevelReached { level: 5 },
    },
    AchievementDef {
        id: "level_10",
        name: "Scholar",
        description: "Reach level 10",
        category: AchievementCategory::Special,
        icon: "🎓",
        xp_reward: 100,
        requirement: Requirement::LevelReached { level: 10 },
    },
];

/// Badge catalog, in evaluation order
pub const BADGES: &[BadgeDef] = &[
    BadgeDef {
        id: "xp_bronze",
        name: "Bronze Learner",
        description: "Earn 500 XP",
        tier: BadgeTier::Bronze,
        icon: "🥉",
        xp_reward: 25,
        requirement: Requirement::TotalXp { amount: 500 },
    },
    BadgeDef {
        id: "xp_silver",
        name: "Silver Learner",
        description: "Earn 2,500 XP",
        tier: BadgeTier::Silver,
        icon: "🥈",
        xp_reward: 50,
        requirement: Requirement::TotalXp { amount: 2_500 },
    },
    BadgeDef {
        id: "xp_gold",
        name: "Gold Learner",
        description: "Earn 10,000 XP",
        tier: BadgeTier::Gold,
        icon: "🥇",
        xp_reward: 100,
        requirement: Requirement::TotalXp { amount: 10_000 },
    },
    BadgeDef {
        id: "xp_platinum",
        name: "Platinum Learner",
        description: "Earn 50,000 XP",
        tier: BadgeTier::Platinum,
        icon: "🏆",
        xp_reward: 250,
        requirement: Requirement::TotalXp { amount: 50_000 },
    },
    BadgeDef {
        id: "streak_bronze",
        name: "Kindling",
        description: "Keep a 3-day streak",
        tier: BadgeTier::Bronze,
        icon: "🕯️",
        xp_reward: 15,
        requirement: Requirement::StreakDays { days: 3 },
    },
    BadgeDef {
        id: "streak_silver",
        name: "Steady Flame",
        description: "Keep a 14-day streak",
        tier: BadgeTier::Silver,
        icon: "🔥",
        xp_reward: 50,
        requirement: Requirement::StreakDays { days: 14 },
    },
    BadgeDef {
        id: "streak_gold",
        name: "Blazing",
        description: "Keep a 60-day streak",
        tier: BadgeTier::Gold,
        icon: "☀️",
        xp_reward: 150,
        requirement: Requirement::StreakDays { days: 60 },
    },
    BadgeDef {
        id: "streak_platinum",
        name: "Eternal Flame",
        description: "Keep a 180-day streak",
        tier: BadgeTier::Platinum,
        icon: "🌟",
        xp_reward: 400,
        requirement: Requirement::StreakDays { days: 180 },
    },
];
