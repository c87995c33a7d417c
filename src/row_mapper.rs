// Flat row decoding. Each decoder pulls typed columns out of a single
// Postgres row and normalizes storage forms (lower-case roles, combined
// timestamps) into the shapes the rest of the service works with. A null in
// a column the schema guarantees non-null surfaces as a Decode error and
// aborts the enclosing fetch.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::error::{AppError, AppResult};
use crate::models::{format_id, EntityId, EventType, Location, Role, Shift, Volunteer};

/// Typed column access with the column name attached to any failure.
pub fn column<'r, T>(row: &'r PgRow, name: &str) -> AppResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| AppError::Decode(format!("column {}: {}", name, e)))
}

/// An event row from the search or by-id query, locations left-joined in.
#[derive(Debug, Clone)]
pub struct EventRow {
    pub event_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub is_virtual: bool,
    pub location_id: Option<EntityId>,
    pub location: Option<Location>,
}

impl EventRow {
    /// Boundary conversion: native key becomes the wire id, stored flags
    /// become the derived modality. Nested sequences start empty.
    pub fn into_event(self) -> crate::models::Event {
        crate::models::Event {
            id: format_id(self.event_id),
            name: self.name,
            description: self.description,
            event_type: EventType::derive(self.is_virtual, self.location_id),
            location: self.location,
            opportunities: Vec::new(),
            shifts: Vec::new(),
        }
    }
}

/// A shift row from the filtered search path, carrying its owning event.
#[derive(Debug, Clone)]
pub struct ShiftRow {
    pub shift_id: EntityId,
    pub event_id: EntityId,
    pub role: Role,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ShiftRow {
    pub fn into_shift(self) -> Shift {
        Shift {
            id: format_id(self.shift_id),
            date: shift_date(&self.start),
            start_time: shift_time(&self.start),
            end_time: shift_time(&self.end),
            role: Some(self.role),
            max_volunteers: None,
            assigned_volunteers: Vec::new(),
        }
    }
}

/// An opportunity row from the by-id nesting path.
#[derive(Debug, Clone)]
pub struct OpportunityRow {
    pub opportunity_id: EntityId,
    pub role: Role,
    pub is_virtual: bool,
}

/// A shift row from the by-id nesting path, capacity included.
#[derive(Debug, Clone)]
pub struct ShiftDetailRow {
    pub shift_id: EntityId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub max_volunteers: Option<i32>,
}

impl ShiftDetailRow {
    pub fn into_shift(self, assigned_volunteers: Vec<Volunteer>) -> Shift {
        Shift {
            id: format_id(self.shift_id),
            date: shift_date(&self.start),
            start_time: shift_time(&self.start),
            end_time: shift_time(&self.end),
            role: None,
            max_volunteers: self.max_volunteers,
            assigned_volunteers,
        }
    }
}

/// Date component of a stored shift timestamp.
pub fn shift_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Time-of-day component of a stored shift timestamp. Start and end are
/// decomposed independently; no end-after-start validation happens here.
pub fn shift_time(ts: &DateTime<Utc>) -> String {
    ts.format("%H:%M:%S").to_string()
}

pub fn decode_event_row(row: &PgRow) -> AppResult<EventRow> {
    let event_id: EntityId = column(row, "event_id")?;
    let name: String = column(row, "event_name")?;
    let description: Option<String> = column(row, "description")?;
    let is_virtual: bool = column(row, "event_is_virtual")?;
    let location_id: Option<EntityId> = column(row, "location_id")?;
    let location_name: Option<String> = column(row, "location_name")?;
    let address: Option<String> = column(row, "street_address")?;
    let city: Option<String> = column(row, "city")?;
    let state: Option<String> = column(row, "state")?;
    let zip_code: Option<String> = column(row, "zip_code")?;

    // A venue is only attached when the link and its required columns are
    // all present; a dangling location_id leaves the event venue-less.
    let location = match (location_id, address, city, state) {
        (Some(_), Some(address), Some(city), Some(state)) => Some(Location {
            name: location_name,
            address,
            city,
            state,
            zip_code,
        }),
        _ => None,
    };

    Ok(EventRow {
        event_id,
        name,
        description,
        is_virtual,
        location_id,
        location,
    })
}

pub fn decode_shift_row(row: &PgRow) -> AppResult<ShiftRow> {
    let role: String = column(row, "role")?;
    Ok(ShiftRow {
        shift_id: column(row, "shift_id")?,
        event_id: column(row, "event_id")?,
        role: Role::from_store(&role),
        start: column(row, "shift_start")?,
        end: column(row, "shift_end")?,
    })
}

pub fn decode_opportunity_row(row: &PgRow) -> AppResult<OpportunityRow> {
    let role: String = column(row, "role")?;
    Ok(OpportunityRow {
        opportunity_id: column(row, "opportunity_id")?,
        role: Role::from_store(&role),
        is_virtual: column(row, "opportunity_is_virtual")?,
    })
}

pub fn decode_shift_detail_row(row: &PgRow) -> AppResult<ShiftDetailRow> {
    Ok(ShiftDetailRow {
        shift_id: column(row, "shift_id")?,
        start: column(row, "shift_start")?,
        end: column(row, "shift_end")?,
        max_volunteers: column(row, "max_volunteers")?,
    })
}

pub fn decode_volunteer_row(row: &PgRow) -> AppResult<Volunteer> {
    let volunteer_id: EntityId = column(row, "volunteer_id")?;
    Ok(Volunteer {
        id: format_id(volunteer_id),
        first_name: column(row, "first_name")?,
        last_name: column(row, "last_name")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_decomposition() {
        let start = Utc.with_ymd_and_hms(2025, 8, 5, 9, 30, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 8, 5, 13, 0, 0).unwrap();

        assert_eq!(shift_date(&start), "2025-08-05");
        assert_eq!(shift_time(&start), "09:30:00");
        assert_eq!(shift_time(&end), "13:00:00");
    }

    #[test]
    fn test_search_shift_conversion() {
        let row = ShiftRow {
            shift_id: 31,
            event_id: 7,
            role: Role::Speaker,
            start: Utc.with_ymd_and_hms(2025, 8, 5, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 8, 5, 17, 0, 0).unwrap(),
        };
        let shift = row.into_shift();

        assert_eq!(shift.id, "31");
        assert_eq!(shift.date, "2025-08-05");
        assert_eq!(shift.start_time, "09:00:00");
        assert_eq!(shift.end_time, "17:00:00");
        assert_eq!(shift.role, Some(Role::Speaker));
        // The search shape carries neither capacity nor assignments.
        assert_eq!(shift.max_volunteers, None);
        assert!(shift.assigned_volunteers.is_empty());
    }

    #[test]
    fn test_detail_shift_conversion_keeps_capacity() {
        let row = ShiftDetailRow {
            shift_id: 8,
            start: Utc.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap(),
            max_volunteers: Some(5),
        };
        let shift = row.into_shift(vec![Volunteer {
            id: "2".to_string(),
            first_name: "Dana".to_string(),
            last_name: "Reyes".to_string(),
        }]);

        assert_eq!(shift.max_volunteers, Some(5));
        assert_eq!(shift.role, None);
        assert_eq!(shift.assigned_volunteers.len(), 1);
    }

    #[test]
    fn test_event_row_conversion_derives_modality() {
        let row = EventRow {
            event_id: 7,
            name: "Food Drive".to_string(),
            description: None,
            is_virtual: true,
            location_id: None,
            location: None,
        };
        let event = row.into_event();

        assert_eq!(event.id, "7");
        assert_eq!(event.event_type, EventType::Virtual);
        assert!(event.location.is_none());
        assert!(event.shifts.is_empty());
        assert!(event.opportunities.is_empty());
    }
}
