/// PostgreSQL `BIGSERIAL` key.
pub type DbId = i64;

/// Always UTC; stored as `TIMESTAMPTZ`.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Money in the currency's smallest unit: santim for ETB, cents for USD.
pub type MinorUnits = i64;
