//! Storage-layer tests against an in-memory database

use chrono::{Duration, TimeZone, Utc};
use common::models::{ChallengeItem, ChallengePeriod, ChallengeSet, Module, Streak};
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

fn sample_set(period: ChallengePeriod) -> ChallengeSet {
    let now = Utc.with_ymd_and_hms(2026, 8, 7, 9, 0, 0).unwrap();
    ChallengeSet {
        period,
        refreshed_at: now,
        expires_at: now + Duration::days(1),
        challenges: vec![
            ChallengeItem {
                id: "reading_sprint".to_string(),
                description: "Complete 3 reading exercises".to_string(),
                module: Module::Reading,
                activity_type: None,
                target: 3,
                progress: 0,
                completed: false,
                xp_reward: 30,
            },
            ChallengeItem {
                id: "flashcard_blitz".to_string(),
                description: "Review 5 flashcards".to_string(),
                module: Module::Vocabulary,
                activity_type: Some("flashcard_review".to_string()),
                target: 5,
                progress: 0,
                completed: false,
                xp_reward: 20,
            },
        ],
    }
}

#[tokio::test]
async fn get_or_create_is_idempotent() {
    let pool = test_pool().await;
    let user = Uuid::new_v4();

    let first = db::profiles::get_or_create(&pool, user).await.unwrap();
    let second = db::profiles::get_or_create(&pool, user).await.unwrap();

    assert_eq!(first.user_id, second.user_id);
    assert_eq!(first.level, 1);
    assert_eq!(first.experience, 0);
    assert_eq!(db::profiles::count(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_first_touch_creates_one_profile() {
    let pool = test_pool().await;
    let user = Uuid::new_v4();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            db::profiles::get_or_create(&pool, user).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("no duplicate-key error surfaces");
    }

    assert_eq!(db::profiles::count(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_xp_grants_are_not_lost() {
    let pool = test_pool().await;
    let user = Uuid::new_v4();
    db::profiles::get_or_create(&pool, user).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let pool = pool.clone();
        handles.push(tokio::spawn(
            async move { db::profiles::add_xp(&pool, user, 5).await },
        ));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let profile = db::profiles::get(&pool, user).await.unwrap().unwrap();
    assert_eq!(profile.experience, 50);
    assert_eq!(profile.stats.total_xp, 50);
}

#[tokio::test]
async fn achievement_unlock_is_exactly_once() {
    let pool = test_pool().await;
    let user = Uuid::new_v4();
    db::profiles::get_or_create(&pool, user).await.unwrap();

    let now = Utc::now();
    assert!(db::unlocks::insert_achievement(&pool, user, "first_steps", now)
        .await
        .unwrap());
    assert!(!db::unlocks::insert_achievement(&pool, user, "first_steps", now)
        .await
        .unwrap());

    let unlocked = db::unlocks::list_achievements(&pool, user).await.unwrap();
    assert_eq!(unlocked.len(), 1);
    assert_eq!(unlocked[0].id, "first_steps");
}

#[tokio::test]
async fn module_counter_accumulates() {
    let pool = test_pool().await;
    let user = Uuid::new_v4();
    db::profiles::get_or_create(&pool, user).await.unwrap();

    for _ in 0..3 {
        db::profiles::increment_module_activity(&pool, user, Module::Grammar)
            .await
            .unwrap();
    }
    db::profiles::increment_module_activity(&pool, user, Module::Reading)
        .await
        .unwrap();

    let counts = db::profiles::module_counts(&pool, user).await.unwrap();
    assert_eq!(counts.get(&Module::Grammar), Some(&3));
    assert_eq!(counts.get(&Module::Reading), Some(&1));
}

#[tokio::test]
async fn streak_update_persists_and_bumps_active_days() {
    let pool = test_pool().await;
    let user = Uuid::new_v4();
    db::profiles::get_or_create(&pool, user).await.unwrap();

    let streak = Streak {
        current: 4,
        longest: 6,
        last_activity: Some(Utc::now()),
    };
    db::profiles::update_streak(&pool, user, &streak, true)
        .await
        .unwrap();
    db::profiles::update_streak(&pool, user, &streak, false)
        .await
        .unwrap();

    let profile = db::profiles::get(&pool, user).await.unwrap().unwrap();
    assert_eq!(profile.streak.current, 4);
    assert_eq!(profile.streak.longest, 6);
    assert!(profile.streak.last_activity.is_some());
    assert_eq!(profile.stats.active_days, 1);
}

#[tokio::test]
async fn challenge_progress_caps_and_completes_once() {
    let pool = test_pool().await;
    let user = Uuid::new_v4();
    let set = sample_set(ChallengePeriod::Daily);
    db::challenges::replace_set(&pool, user, &set).await.unwrap();

    // Five reading activities against a target of 3
    for _ in 0..5 {
        db::challenges::increment_progress(
            &pool,
            user,
            ChallengePeriod::Daily,
            Module::Reading,
            "complete_exercise",
            1,
        )
        .await
        .unwrap();
    }

    let completed = db::challenges::take_completed(&pool, user, ChallengePeriod::Daily)
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, "reading_sprint");
    assert_eq!(completed[0].progress, 3, "progress capped at target");

    // Re-running yields nothing new
    let again = db::challenges::take_completed(&pool, user, ChallengePeriod::Daily)
        .await
        .unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn challenge_activity_type_filter_matches() {
    let pool = test_pool().await;
    let user = Uuid::new_v4();
    let set = sample_set(ChallengePeriod::Daily);
    db::challenges::replace_set(&pool, user, &set).await.unwrap();

    // Wrong activity type: the flashcard item must not move
    db::challenges::increment_progress(
        &pool,
        user,
        ChallengePeriod::Daily,
        Module::Vocabulary,
        "complete_exercise",
        1,
    )
    .await
    .unwrap();

    let loaded = db::challenges::get_set(&pool, user, ChallengePeriod::Daily)
        .await
        .unwrap()
        .unwrap();
    let flashcards = &loaded.challenges[1];
    assert_eq!(flashcards.progress, 0);

    db::challenges::increment_progress(
        &pool,
        user,
        ChallengePeriod::Daily,
        Module::Vocabulary,
        "flashcard_review",
        2,
    )
    .await
    .unwrap();

    let loaded = db::challenges::get_set(&pool, user, ChallengePeriod::Daily)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.challenges[1].progress, 2);
}

#[tokio::test]
async fn expired_sets_are_swept() {
    let pool = test_pool().await;
    let user = Uuid::new_v4();
    let set = sample_set(ChallengePeriod::Daily);
    db::challenges::replace_set(&pool, user, &set).await.unwrap();

    // Not expired yet
    let removed = db::challenges::delete_expired(&pool, set.refreshed_at)
        .await
        .unwrap();
    assert_eq!(removed, 0);

    let removed = db::challenges::delete_expired(&pool, set.expires_at + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(db::challenges::get_set(&pool, user, ChallengePeriod::Daily)
        .await
        .unwrap()
        .is_none());
}
