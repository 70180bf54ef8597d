//! Cached-level reconciliation
//!
//! `level` and `experience_to_next_level` are derived caches of
//! `experience`. Concurrent recording can leave them briefly stale, and
//! any change to the experience curve invalidates them wholesale; this
//! pass recomputes both for every profile.

use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::curve;
use common::{Error, Result};

/// Outcome of a level resync pass
#[derive(Debug)]
pub struct ResyncStats {
    pub profiles_checked: usize,
    pub profiles_updated: usize,
}

/// Recompute every profile's cached level columns from the curve
pub async fn sync_levels(pool: &Pool<Sqlite>) -> Result<ResyncStats> {
    info!("Starting level resync for all profiles");

    let rows = db::profiles::level_rows(pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    let profiles_checked = rows.len();
    let mut profiles_updated = 0;

    for row in rows {
        let expected = curve::level_for_experience(row.experience);
        if row.level != expected.level || row.experience_to_next_level != expected.xp_to_next {
            db::profiles::set_level(pool, row.user_id, expected.level, expected.xp_to_next)
                .await
                .map_err(|e| Error::Database(e.to_string()))?;
            profiles_updated += 1;
        }
    }

    info!(
        profiles_checked,
        profiles_updated, "Level resync complete"
    );

    Ok(ResyncStats {
        profiles_checked,
        profiles_updated,
    })
}
