// Database access - connection pool and schema bootstrap for the scheduler.
// Every service operation is its own round trip; no explicit transactions
// are taken here.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(8))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| {
                AppError::Configuration(format!("Failed to connect to database: {}", e))
            })?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check to verify database connectivity
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Store(format!("Database health check failed: {}", e)))?;
        Ok(())
    }

    /// Create the scheduler schema. Events, locations, opportunities and
    /// shifts are normally pre-seeded; volunteers and assignments are
    /// written by the service at runtime.
    pub async fn init(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS locations (
                location_id BIGSERIAL PRIMARY KEY,
                location_name TEXT,
                street_address TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                zip_code TEXT
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(format!("Failed to create locations table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                event_id BIGSERIAL PRIMARY KEY,
                event_name TEXT NOT NULL,
                description TEXT,
                event_is_virtual BOOLEAN NOT NULL DEFAULT false,
                location_id BIGINT REFERENCES locations(location_id)
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(format!("Failed to create events table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS opportunities (
                opportunity_id BIGSERIAL PRIMARY KEY,
                event_id BIGINT NOT NULL REFERENCES events(event_id),
                role TEXT NOT NULL,
                opportunity_is_virtual BOOLEAN NOT NULL DEFAULT false
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(format!("Failed to create opportunities table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS opportunity_requirements (
                opportunity_id BIGINT NOT NULL REFERENCES opportunities(opportunity_id),
                required_qualification TEXT NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::Store(format!(
                "Failed to create opportunity requirements table: {}",
                e
            ))
        })?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS shifts (
                shift_id BIGSERIAL PRIMARY KEY,
                opportunity_id BIGINT NOT NULL REFERENCES opportunities(opportunity_id),
                shift_start TIMESTAMPTZ NOT NULL,
                shift_end TIMESTAMPTZ NOT NULL,
                max_volunteers INTEGER
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(format!("Failed to create shifts table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS volunteers (
                volunteer_id BIGSERIAL PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(format!("Failed to create volunteers table: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS volunteer_qualifications (
                volunteer_id BIGINT NOT NULL REFERENCES volunteers(volunteer_id),
                qualification TEXT NOT NULL
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::Store(format!(
                "Failed to create volunteer qualifications table: {}",
                e
            ))
        })?;

        // The unique pair constraint is what makes assignment idempotent:
        // concurrent inserts for the same pair race here and the loser is a
        // no-op via ON CONFLICT DO NOTHING.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS volunteer_shifts (
                volunteer_id BIGINT NOT NULL REFERENCES volunteers(volunteer_id),
                shift_id BIGINT NOT NULL REFERENCES shifts(shift_id),
                assigned_at TIMESTAMPTZ NOT NULL,
                status TEXT NOT NULL,
                UNIQUE (volunteer_id, shift_id)
            )
        "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(format!("Failed to create volunteer shifts table: {}", e)))?;

        // Create performance indexes
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_location ON events(location_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Store(format!("Failed to create events index: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_opportunities_event ON opportunities(event_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(format!("Failed to create opportunities index: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_shifts_opportunity ON shifts(opportunity_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Store(format!("Failed to create shifts index: {}", e)))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_shifts_start ON shifts(shift_start)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Store(format!("Failed to create shift start index: {}", e)))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_volunteer_shifts_shift ON volunteer_shifts(shift_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::Store(format!("Failed to create volunteer shifts index: {}", e))
        })?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_volunteer_qualifications_volunteer \
             ON volunteer_qualifications(volunteer_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::Store(format!(
                "Failed to create volunteer qualifications index: {}",
                e
            ))
        })?;

        Ok(())
    }
}
