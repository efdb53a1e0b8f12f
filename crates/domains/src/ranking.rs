//! Gravity ranking. The Postgres `popularity()` function computes the same
//! value; this copy serves adapters that rank without a database.

use chrono::{DateTime, Utc};

/// Hours added to every age so brand-new rows do not divide by ~0.
pub const AGE_OFFSET_HOURS: f64 = 2.0;
pub const GRAVITY: f64 = 1.5;

/// `score / (age_hours + 2) ^ 1.5`
pub fn popularity(score: i64, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age_hours = (now - created_at).num_seconds().max(0) as f64 / 3600.0;
    score as f64 / (age_hours + AGE_OFFSET_HOURS).powf(GRAVITY)
}
