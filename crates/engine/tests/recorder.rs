//! End-to-end recording scenarios against an in-memory database

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::models::{ChallengeItem, ChallengePeriod, ChallengeSet, Module, Streak};
use common::Error;
use engine::{curve, ActivityRecorder, ChallengeTracker};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

async fn test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    db::run_migrations(&pool).await.expect("run migrations");
    pool
}

#[tokio::test]
async fn first_activity_creates_profile_and_grants_xp() {
    let pool = test_pool().await;
    let recorder = ActivityRecorder::new(pool.clone());
    let user = Uuid::new_v4();

    let outcome = recorder
        .record(user, Module::Reading, "complete_exercise", &Value::Null)
        .await
        .unwrap();

    assert_eq!(outcome.xp_earned, 20);
    assert!(!outcome.leveled_up);
    assert_eq!(outcome.streak.current, 1);

    // First activity unlocks the first-steps milestone
    assert!(outcome
        .new_achievements
        .iter()
        .any(|a| a.id == "first_steps"));

    let profile = db::profiles::get(&pool, user).await.unwrap().unwrap();
    assert_eq!(profile.level, 1);
    // 20 from the activity plus the 10 XP unlock reward
    assert_eq!(profile.experience, 30);
    assert_eq!(profile.stats.active_days, 1);
    assert_eq!(
        profile.stats.module_activity.get(&Module::Reading),
        Some(&1)
    );
}

#[tokio::test]
async fn crossing_the_threshold_levels_up() {
    let pool = test_pool().await;
    let recorder = ActivityRecorder::new(pool.clone());
    let user = Uuid::new_v4();
    let metadata = json!({ "score": 100 });

    // finish_book with a perfect score grants 70 XP
    let first = recorder
        .record(user, Module::Reading, "finish_book", &metadata)
        .await
        .unwrap();
    assert_eq!(first.xp_earned, 70);
    assert!(!first.leveled_up);

    let second = recorder
        .record(user, Module::Reading, "finish_book", &metadata)
        .await
        .unwrap();
    assert!(second.leveled_up);
    assert_eq!(second.new_level, Some(2));
}

#[tokio::test]
async fn streak_extends_across_days() {
    let pool = test_pool().await;
    let recorder = ActivityRecorder::new(pool.clone());
    let user = Uuid::new_v4();

    db::profiles::get_or_create(&pool, user).await.unwrap();
    let yesterday = Streak {
        current: 3,
        longest: 3,
        last_activity: Some(Utc::now() - Duration::days(1)),
    };
    db::profiles::update_streak(&pool, user, &yesterday, true)
        .await
        .unwrap();

    let outcome = recorder
        .record(user, Module::Grammar, "complete_exercise", &Value::Null)
        .await
        .unwrap();

    assert_eq!(outcome.streak.current, 4);
    assert_eq!(outcome.streak.longest, 4);

    // Crossing 3 days earns the bronze streak badge
    assert!(outcome.new_badges.iter().any(|b| b.id == "streak_bronze"));
}

#[tokio::test]
async fn same_day_activities_leave_streak_unchanged() {
    let pool = test_pool().await;
    let recorder = ActivityRecorder::new(pool.clone());
    let user = Uuid::new_v4();

    for _ in 0..2 {
        recorder
            .record(user, Module::Games, "complete_game", &Value::Null)
            .await
            .unwrap();
    }

    let profile = db::profiles::get(&pool, user).await.unwrap().unwrap();
    assert_eq!(profile.streak.current, 1);
    assert_eq!(profile.stats.active_days, 1);
}

#[tokio::test]
async fn unlocked_achievement_never_regrants() {
    let pool = test_pool().await;
    let recorder = ActivityRecorder::new(pool.clone());
    let user = Uuid::new_v4();

    let mut unlocked_at = 0;
    for i in 1..=25 {
        let outcome = recorder
            .record(user, Module::Grammar, "complete_exercise", &Value::Null)
            .await
            .unwrap();
        if outcome
            .new_achievements
            .iter()
            .any(|a| a.id == "grammar_enthusiast")
        {
            unlocked_at = i;
        }
    }
    assert_eq!(unlocked_at, 25);

    // Another qualifying activity unlocks nothing new
    let again = recorder
        .record(user, Module::Grammar, "complete_exercise", &Value::Null)
        .await
        .unwrap();
    assert!(again.new_achievements.is_empty());
    assert!(again.new_badges.is_empty());

    let profile = db::profiles::get(&pool, user).await.unwrap().unwrap();
    let count = profile
        .achievements
        .iter()
        .filter(|a| a.id == "grammar_enthusiast")
        .count();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn concurrent_first_touch_yields_one_profile_and_all_xp() {
    let pool = test_pool().await;
    let recorder = Arc::new(ActivityRecorder::new(pool.clone()));
    let user = Uuid::new_v4();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let recorder = Arc::clone(&recorder);
        handles.push(tokio::spawn(async move {
            recorder
                .record(user, Module::Reading, "complete_exercise", &Value::Null)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("no conflict surfaces");
    }

    assert_eq!(db::profiles::count(&pool).await.unwrap(), 1);

    let profile = db::profiles::get(&pool, user).await.unwrap().unwrap();
    // 4 activities at 20 XP each plus the single first-steps reward
    assert_eq!(profile.experience, 4 * 20 + 10);
    assert_eq!(
        profile.stats.module_activity.get(&Module::Reading),
        Some(&4)
    );
}

#[tokio::test]
async fn invalid_activity_writes_nothing() {
    let pool = test_pool().await;
    let recorder = ActivityRecorder::new(pool.clone());
    let user = Uuid::new_v4();

    let err = recorder
        .record(user, Module::Reading, "teleport", &Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidActivity { .. }));

    assert_eq!(db::profiles::count(&pool).await.unwrap(), 0);
    assert_eq!(db::activity::count_for_user(&pool, user).await.unwrap(), 0);
}

#[tokio::test]
async fn cached_level_always_matches_curve() {
    let pool = test_pool().await;
    let recorder = ActivityRecorder::new(pool.clone());
    let user = Uuid::new_v4();

    for _ in 0..12 {
        recorder
            .record(user, Module::Speaking, "complete_session", &Value::Null)
            .await
            .unwrap();

        let profile = db::profiles::get(&pool, user).await.unwrap().unwrap();
        let expected = curve::level_for_experience(profile.experience);
        assert_eq!(profile.level, expected.level);
        assert_eq!(profile.experience_to_next_level, expected.xp_to_next);
    }
}

#[tokio::test]
async fn resync_repairs_divergent_levels() {
    let pool = test_pool().await;
    let recorder = ActivityRecorder::new(pool.clone());
    let user = Uuid::new_v4();

    recorder
        .record(user, Module::Writing, "submit_essay", &Value::Null)
        .await
        .unwrap();

    // Corrupt the cached level
    db::profiles::set_level(&pool, user, 42, 1).await.unwrap();

    let stats = engine::resync::sync_levels(&pool).await.unwrap();
    assert_eq!(stats.profiles_checked, 1);
    assert_eq!(stats.profiles_updated, 1);

    let profile = db::profiles::get(&pool, user).await.unwrap().unwrap();
    let expected = curve::level_for_experience(profile.experience);
    assert_eq!(profile.level, expected.level);

    // A second pass finds nothing to fix
    let stats = engine::resync::sync_levels(&pool).await.unwrap();
    assert_eq!(stats.profiles_updated, 0);
}

#[tokio::test]
async fn daily_challenge_completes_exactly_once() {
    let pool = test_pool().await;
    let tracker = ChallengeTracker::new(pool.clone());
    let user = Uuid::new_v4();
    db::profiles::get_or_create(&pool, user).await.unwrap();

    // Seed a known daily set so the test is independent of template
    // selection
    let now = Utc::now();
    let set = ChallengeSet {
        period: ChallengePeriod::Daily,
        refreshed_at: now,
        expires_at: now + Duration::days(1),
        challenges: vec![ChallengeItem {
            id: "daily_reading".to_string(),
            description: "Complete 5 reading exercises".to_string(),
            module: Module::Reading,
            activity_type: None,
            target: 5,
            progress: 0,
            completed: false,
            xp_reward: 30,
        }],
    };
    db::challenges::replace_set(&pool, user, &set).await.unwrap();

    let base_xp = db::profiles::experience(&pool, user).await.unwrap();

    for i in 1..=4 {
        let outcome = tracker
            .update_progress(user, Module::Reading, "complete_exercise", &Value::Null)
            .await
            .unwrap();
        assert_eq!(outcome.daily_challenges_updated, 1, "call {i}");
        assert!(outcome.completed_challenges.is_empty(), "call {i}");
    }

    // Fifth matching activity crosses the target
    let fifth = tracker
        .update_progress(user, Module::Reading, "complete_exercise", &Value::Null)
        .await
        .unwrap();
    assert_eq!(fifth.completed_challenges.len(), 1);
    assert_eq!(fifth.completed_challenges[0].id, "daily_reading");

    let after_completion = db::profiles::experience(&pool, user).await.unwrap();
    assert_eq!(after_completion, base_xp + 30);

    // A sixth matching activity re-grants nothing
    let sixth = tracker
        .update_progress(user, Module::Reading, "complete_exercise", &Value::Null)
        .await
        .unwrap();
    assert!(sixth.completed_challenges.is_empty());
    assert_eq!(sixth.daily_challenges_updated, 0);

    let final_xp = db::profiles::experience(&pool, user).await.unwrap();
    assert_eq!(final_xp, base_xp + 30);
}

#[tokio::test]
async fn expired_sets_regenerate_deterministically() {
    let pool = test_pool().await;
    let tracker = ChallengeTracker::new(pool.clone());
    let user = Uuid::new_v4();
    db::profiles::get_or_create(&pool, user).await.unwrap();

    // Plant an expired daily set; the next read must replace it
    let stale = Utc::now() - Duration::days(3);
    let set = ChallengeSet {
        period: ChallengePeriod::Daily,
        refreshed_at: stale,
        expires_at: stale + Duration::days(1),
        challenges: Vec::new(),
    };
    db::challenges::replace_set(&pool, user, &set).await.unwrap();

    let sets = tracker.current_sets(user).await.unwrap();
    let daily = sets
        .iter()
        .find(|s| s.period == ChallengePeriod::Daily)
        .unwrap();
    assert!(daily.expires_at > Utc::now());
    assert_eq!(daily.challenges.len(), 3);
    assert!(daily.challenges.iter().all(|c| !c.completed));

    // Reading the sets again must not reshuffle them
    let again = tracker.current_sets(user).await.unwrap();
    let daily_again = again
        .iter()
        .find(|s| s.period == ChallengePeriod::Daily)
        .unwrap();
    let ids: Vec<_> = daily.challenges.iter().map(|c| &c.id).collect();
    let ids_again: Vec<_> = daily_again.challenges.iter().map(|c| &c.id).collect();
    assert_eq!(ids, ids_again);
}
