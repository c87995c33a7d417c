// Sample data for local development. Events, locations, opportunities and
// shifts are normally provisioned out of band; this seeder stands in for
// that provisioning so the search and assignment paths have something to
// chew on.

use chrono::{TimeZone, Utc};
use sqlx::PgPool;

use crate::database::Database;
use crate::error::{AppError, AppResult};
use crate::models::EntityId;
use crate::row_mapper;

pub async fn seed_sample_data(db: &Database) -> AppResult<()> {
    let pool = db.pool();

    let existing = sqlx::query("SELECT COUNT(*) AS count FROM events")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::Store(format!("error counting events: {}", e)))?;
    let count: i64 = row_mapper::column(&existing, "count")?;
    if count > 0 {
        println!("Events already present; skipping sample data");
        return Ok(());
    }

    let community_center = insert_location(
        pool,
        Some("Eastside Community Center"),
        "1200 Pleasant Valley Rd",
        "Austin",
        "TX",
        Some("78702"),
    )
    .await?;
    let food_bank = insert_location(
        pool,
        Some("North Texas Food Bank"),
        "3677 Mapleshade Ln",
        "Plano",
        "TX",
        Some("75075"),
    )
    .await?;

    // One event per modality.
    let cleanup = insert_event(
        pool,
        "Park Cleanup Day",
        Some("Trash pickup and trail maintenance"),
        false,
        Some(community_center),
    )
    .await?;
    let training = insert_event(
        pool,
        "Volunteer Orientation Webinar",
        Some("Introduction for new volunteers"),
        true,
        None,
    )
    .await?;
    let gala = insert_event(
        pool,
        "Annual Fundraising Gala",
        Some("Hybrid gala with remote speakers"),
        true,
        Some(food_bank),
    )
    .await?;

    let cleanup_support = insert_opportunity(pool, cleanup, "event_support", false).await?;
    let cleanup_lead = insert_opportunity(pool, cleanup, "volunteer_lead", false).await?;
    let training_speaker = insert_opportunity(pool, training, "speaker", true).await?;
    let gala_support = insert_opportunity(pool, gala, "event_support", false).await?;

    insert_requirement(pool, cleanup_lead, "first_aid").await?;
    insert_requirement(pool, gala_support, "food_handler").await?;

    let morning = Utc.with_ymd_and_hms(2025, 9, 6, 9, 0, 0).unwrap();
    let noon = Utc.with_ymd_and_hms(2025, 9, 6, 12, 0, 0).unwrap();
    insert_shift(pool, cleanup_support, morning, noon, Some(12)).await?;
    insert_shift(pool, cleanup_lead, morning, noon, Some(2)).await?;

    let webinar_start = Utc.with_ymd_and_hms(2025, 9, 10, 18, 0, 0).unwrap();
    let webinar_end = Utc.with_ymd_and_hms(2025, 9, 10, 19, 30, 0).unwrap();
    insert_shift(pool, training_speaker, webinar_start, webinar_end, None).await?;

    let gala_start = Utc.with_ymd_and_hms(2025, 10, 4, 17, 0, 0).unwrap();
    let gala_end = Utc.with_ymd_and_hms(2025, 10, 4, 22, 0, 0).unwrap();
    insert_shift(pool, gala_support, gala_start, gala_end, Some(20)).await?;

    let dana = insert_volunteer(pool, "Dana", "Reyes").await?;
    let marcus = insert_volunteer(pool, "Marcus", "Webb").await?;
    insert_qualification(pool, dana, "first_aid").await?;
    insert_qualification(pool, marcus, "food_handler").await?;
    insert_qualification(pool, marcus, "first_aid").await?;

    println!("Seeded 3 events, 4 opportunities, 4 shifts, 2 volunteers");
    Ok(())
}

async fn insert_location(
    pool: &PgPool,
    name: Option<&str>,
    address: &str,
    city: &str,
    state: &str,
    zip_code: Option<&str>,
) -> AppResult<EntityId> {
    let row = sqlx::query(
        "INSERT INTO locations (location_name, street_address, city, state, zip_code) \
         VALUES ($1, $2, $3, $4, $5) RETURNING location_id",
    )
    .bind(name)
    .bind(address)
    .bind(city)
    .bind(state)
    .bind(zip_code)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::Store(format!("error seeding location: {}", e)))?;
    row_mapper::column(&row, "location_id")
}

async fn insert_event(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    is_virtual: bool,
    location_id: Option<EntityId>,
) -> AppResult<EntityId> {
    let row = sqlx::query(
        "INSERT INTO events (event_name, description, event_is_virtual, location_id) \
         VALUES ($1, $2, $3, $4) RETURNING event_id",
    )
    .bind(name)
    .bind(description)
    .bind(is_virtual)
    .bind(location_id)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::Store(format!("error seeding event: {}", e)))?;
    row_mapper::column(&row, "event_id")
}

async fn insert_opportunity(
    pool: &PgPool,
    event_id: EntityId,
    role: &str,
    is_virtual: bool,
) -> AppResult<EntityId> {
    let row = sqlx::query(
        "INSERT INTO opportunities (event_id, role, opportunity_is_virtual) \
         VALUES ($1, $2, $3) RETURNING opportunity_id",
    )
    .bind(event_id)
    .bind(role)
    .bind(is_virtual)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::Store(format!("error seeding opportunity: {}", e)))?;
    row_mapper::column(&row, "opportunity_id")
}

async fn insert_requirement(
    pool: &PgPool,
    opportunity_id: EntityId,
    qualification: &str,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO opportunity_requirements (opportunity_id, required_qualification) \
         VALUES ($1, $2)",
    )
    .bind(opportunity_id)
    .bind(qualification)
    .execute(pool)
    .await
    .map_err(|e| AppError::Store(format!("error seeding requirement: {}", e)))?;
    Ok(())
}

async fn insert_shift(
    pool: &PgPool,
    opportunity_id: EntityId,
    start: chrono::DateTime<Utc>,
    end: chrono::DateTime<Utc>,
    max_volunteers: Option<i32>,
) -> AppResult<EntityId> {
    let row = sqlx::query(
        "INSERT INTO shifts (opportunity_id, shift_start, shift_end, max_volunteers) \
         VALUES ($1, $2, $3, $4) RETURNING shift_id",
    )
    .bind(opportunity_id)
    .bind(start)
    .bind(end)
    .bind(max_volunteers)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::Store(format!("error seeding shift: {}", e)))?;
    row_mapper::column(&row, "shift_id")
}

async fn insert_volunteer(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
) -> AppResult<EntityId> {
    let row = sqlx::query(
        "INSERT INTO volunteers (first_name, last_name, created_at) \
         VALUES ($1, $2, NOW()) RETURNING volunteer_id",
    )
    .bind(first_name)
    .bind(last_name)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::Store(format!("error seeding volunteer: {}", e)))?;
    row_mapper::column(&row, "volunteer_id")
}

async fn insert_qualification(
    pool: &PgPool,
    volunteer_id: EntityId,
    qualification: &str,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO volunteer_qualifications (volunteer_id, qualification) VALUES ($1, $2)",
    )
    .bind(volunteer_id)
    .bind(qualification)
    .execute(pool)
    .await
    .map_err(|e| AppError::Store(format!("error seeding qualification: {}", e)))?;
    Ok(())
}
