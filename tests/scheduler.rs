// Integration tests that exercise the service against a live Postgres
// instance. They are ignored by default; run with:
//
//   DATABASE_URL=postgres://... cargo test -- --ignored

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::Row;
use volunteer_scheduler::database::Database;
use volunteer_scheduler::error::AppError;
use volunteer_scheduler::models::{EventFilter, EventType};
use volunteer_scheduler::services::SchedulerService;

async fn scheduler() -> SchedulerService {
    let url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    let database = Database::new(&url).await.expect("failed to connect");
    database.init().await.expect("failed to create schema");
    SchedulerService::new(Arc::new(database))
}

fn unique_tag(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}_{}", prefix, nanos)
}

/// Insert an event with one opportunity and one shift, returning
/// (event_id, shift_id).
async fn seed_event_with_shift(
    service: &SchedulerService,
    name: &str,
    is_virtual: bool,
    location_id: Option<i64>,
) -> (i64, i64) {
    let pool = service.database();
    let pool = pool.pool();

    let event_id: i64 = sqlx::query(
        "INSERT INTO events (event_name, description, event_is_virtual, location_id) \
         VALUES ($1, NULL, $2, $3) RETURNING event_id",
    )
    .bind(name)
    .bind(is_virtual)
    .bind(location_id)
    .fetch_one(pool)
    .await
    .expect("failed to seed event")
    .get("event_id");

    let opportunity_id: i64 = sqlx::query(
        "INSERT INTO opportunities (event_id, role, opportunity_is_virtual) \
         VALUES ($1, 'event_support', false) RETURNING opportunity_id",
    )
    .bind(event_id)
    .fetch_one(pool)
    .await
    .expect("failed to seed opportunity")
    .get("opportunity_id");

    let shift_id: i64 = sqlx::query(
        "INSERT INTO shifts (opportunity_id, shift_start, shift_end, max_volunteers) \
         VALUES ($1, '2025-09-06 09:00:00+00', '2025-09-06 12:00:00+00', 10) \
         RETURNING shift_id",
    )
    .bind(opportunity_id)
    .fetch_one(pool)
    .await
    .expect("failed to seed shift")
    .get("shift_id");

    (event_id, shift_id)
}

#[tokio::test]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn assignment_is_idempotent_and_round_trips() {
    let service = scheduler().await;
    let (event_id, shift_id) = seed_event_with_shift(
        &service,
        &unique_tag("Cleanup"),
        false,
        None,
    )
    .await;

    let volunteer = service
        .create_volunteer("Dana", "Reyes")
        .await
        .expect("failed to create volunteer");

    let first = service
        .assign_volunteer_to_shift(&shift_id.to_string(), &volunteer.id)
        .await;
    let second = service
        .assign_volunteer_to_shift(&shift_id.to_string(), &volunteer.id)
        .await;
    assert!(first.success);
    assert!(second.success, "duplicate assignment must be a no-op success");

    let count: i64 = sqlx::query(
        "SELECT COUNT(*) AS count FROM volunteer_shifts \
         WHERE shift_id = $1 AND volunteer_id = $2",
    )
    .bind(shift_id)
    .bind(volunteer.id.parse::<i64>().unwrap())
    .fetch_one(service.database().pool())
    .await
    .expect("failed to count assignments")
    .get("count");
    assert_eq!(count, 1, "exactly one assignment row must exist");

    // The volunteer shows up in the event's nested assigned-volunteer list.
    let event = service
        .get_event_by_id(&event_id.to_string())
        .await
        .expect("failed to fetch event");
    let assigned: Vec<&str> = event
        .opportunities
        .iter()
        .flat_map(|opportunity| &opportunity.shifts)
        .flat_map(|shift| &shift.assigned_volunteers)
        .map(|v| v.id.as_str())
        .collect();
    assert!(assigned.contains(&volunteer.id.as_str()));
}

#[tokio::test]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn missing_event_is_not_found() {
    let service = scheduler().await;

    let result = service.get_event_by_id("999999999").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn modality_is_derived_from_stored_flags() {
    let service = scheduler().await;

    let location_id: i64 = sqlx::query(
        "INSERT INTO locations (location_name, street_address, city, state, zip_code) \
         VALUES ('Community Center', '100 Main St', 'Austin', 'TX', NULL) \
         RETURNING location_id",
    )
    .fetch_one(service.database().pool())
    .await
    .expect("failed to seed location")
    .get("location_id");

    let (virtual_id, _) =
        seed_event_with_shift(&service, &unique_tag("Webinar"), true, None).await;
    let (hybrid_id, _) =
        seed_event_with_shift(&service, &unique_tag("Gala"), true, Some(location_id)).await;

    let virtual_event = service
        .get_event_by_id(&virtual_id.to_string())
        .await
        .expect("failed to fetch virtual event");
    assert_eq!(virtual_event.event_type, EventType::Virtual);
    assert!(virtual_event.location.is_none());

    let hybrid_event = service
        .get_event_by_id(&hybrid_id.to_string())
        .await
        .expect("failed to fetch hybrid event");
    assert_eq!(hybrid_event.event_type, EventType::Hybrid);
    let location = hybrid_event.location.expect("hybrid event keeps its venue");
    assert_eq!(location.city, "Austin");
}

#[tokio::test]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn unfiltered_search_includes_seeded_event_with_shifts() {
    let service = scheduler().await;
    let name = unique_tag("FoodDrive");
    let (event_id, _) = seed_event_with_shift(&service, &name, false, None).await;

    let events = service
        .get_filtered_events(&EventFilter::default())
        .await
        .expect("failed to search events");

    let found = events
        .iter()
        .find(|event| event.id == event_id.to_string())
        .expect("seeded event must match the empty filter");
    assert_eq!(found.name, name);
    assert_eq!(found.event_type, EventType::InPerson);
    assert_eq!(found.shifts.len(), 1, "search returns flattened shifts");
    assert!(found.opportunities.is_empty());
}

#[tokio::test]
#[ignore = "requires a live Postgres via DATABASE_URL"]
async fn qualification_search_deduplicates_volunteers() {
    let service = scheduler().await;
    let volunteer = service
        .create_volunteer("Marcus", "Webb")
        .await
        .expect("failed to create volunteer");
    let volunteer_id = volunteer.id.parse::<i64>().unwrap();

    // Two matching qualifications; the volunteer must come back once.
    let first_aid = unique_tag("first_aid");
    let food_handler = unique_tag("food_handler");
    for qualification in [&first_aid, &food_handler] {
        sqlx::query(
            "INSERT INTO volunteer_qualifications (volunteer_id, qualification) \
             VALUES ($1, $2)",
        )
        .bind(volunteer_id)
        .bind(qualification)
        .execute(service.database().pool())
        .await
        .expect("failed to seed qualification");
    }

    let matches = service
        .get_qualified_volunteers(&[first_aid.clone(), food_handler.clone()])
        .await
        .expect("failed to search volunteers");
    let hits: Vec<_> = matches
        .iter()
        .filter(|candidate| candidate.id == volunteer.id)
        .collect();
    assert_eq!(hits.len(), 1);

    // Empty qualification set returns the whole roster.
    let roster = service
        .get_qualified_volunteers(&[])
        .await
        .expect("failed to fetch roster");
    assert!(roster.iter().any(|candidate| candidate.id == volunteer.id));
}
