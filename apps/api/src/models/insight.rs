use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user-authored note about a brand, as stored and served.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: i64,
    pub brand: i64,
    pub created_at: DateTime<Utc>,
    pub text: String,
}
