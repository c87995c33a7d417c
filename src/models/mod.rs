// Domain records for the scheduler. Identifiers are native i64 keys inside
// the service and decimal strings on the wire; the conversion happens at the
// service boundary and nowhere else.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub type EntityId = i64;

pub fn format_id(id: EntityId) -> String {
    id.to_string()
}

pub fn parse_id(kind: &str, value: &str) -> AppResult<EntityId> {
    value
        .trim()
        .parse::<EntityId>()
        .map_err(|_| AppError::Validation(format!("invalid {} id: {}", kind, value)))
}

/// Event modality, derived from the stored virtual flag and location link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "VIRTUAL")]
    Virtual,
    #[serde(rename = "IN_PERSON")]
    InPerson,
    #[serde(rename = "HYBRID")]
    Hybrid,
}

impl EventType {
    /// A virtual event with a venue is hybrid; the in-person predicate only
    /// checks the flag, so a non-virtual event with a venue stays in-person.
    pub fn derive(is_virtual: bool, location_id: Option<EntityId>) -> Self {
        if is_virtual && location_id.is_some() {
            EventType::Hybrid
        } else if is_virtual {
            EventType::Virtual
        } else {
            EventType::InPerson
        }
    }

    /// Filter values outside the known set are dropped by the caller, which
    /// turns an unrecognized modality into "no restriction".
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "VIRTUAL" => Some(EventType::Virtual),
            "IN_PERSON" => Some(EventType::InPerson),
            "HYBRID" => Some(EventType::Hybrid),
            _ => None,
        }
    }
}

/// Opportunity role. Stored lower-case, exposed upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "EVENT_SUPPORT")]
    EventSupport,
    #[serde(rename = "ADVOCACY")]
    Advocacy,
    #[serde(rename = "SPEAKER")]
    Speaker,
    #[serde(rename = "VOLUNTEER_LEAD")]
    VolunteerLead,
    #[serde(rename = "ATTENDEE_ONLY")]
    AttendeeOnly,
    #[serde(rename = "OTHER")]
    Other,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "EVENT_SUPPORT" => Some(Role::EventSupport),
            "ADVOCACY" => Some(Role::Advocacy),
            "SPEAKER" => Some(Role::Speaker),
            "VOLUNTEER_LEAD" => Some(Role::VolunteerLead),
            "ATTENDEE_ONLY" => Some(Role::AttendeeOnly),
            "OTHER" => Some(Role::Other),
            _ => None,
        }
    }

    /// Lenient decode for role text coming back from the store; a dirty row
    /// must not poison a whole fetch.
    pub fn from_store(value: &str) -> Self {
        Self::parse(value).unwrap_or(Role::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::EventSupport => "EVENT_SUPPORT",
            Role::Advocacy => "ADVOCACY",
            Role::Speaker => "SPEAKER",
            Role::VolunteerLead => "VOLUNTEER_LEAD",
            Role::AttendeeOnly => "ATTENDEE_ONLY",
            Role::Other => "OTHER",
        }
    }

    /// Form the role takes in the opportunities table.
    pub fn storage_value(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }
}

/// Search criteria after boundary conversion: dates parsed, enums resolved.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub cities: Vec<String>,
    pub event_type: Option<EventType>,
    pub roles: Vec<Role>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl EventFilter {
    pub fn has_date_bounds(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub location: Option<Location>,
    /// Populated by the by-id lookup (full nesting).
    pub opportunities: Vec<Opportunity>,
    /// Populated by the filtered search (flattened, no opportunity level).
    pub shifts: Vec<Shift>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub role: Role,
    pub is_virtual: bool,
    pub requires_qualifications: Vec<String>,
    pub shifts: Vec<Shift>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    /// Carried on the flattened search shape; the nested shape keeps the
    /// role on the owning opportunity instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub max_volunteers: Option<i32>,
    pub assigned_volunteers: Vec<Volunteer>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
    pub success: bool,
    pub message: Option<String>,
}

/// Creation input accepted by the (unimplemented) create-event mutation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_virtual: bool,
    pub location_id: Option<String>,
}
