// Scheduler service - the operation surface for event search, event
// lookup, volunteer creation and shift assignment. Some operations can be
// called by both volunteers and admins; others are admin-only. Calls come
// from the HTTP handlers.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::assembler::EventAccumulator;
use crate::database::Database;
use crate::error::{AppError, AppResult};
use crate::models::{
    format_id, parse_id, AssignmentResult, CreateEventInput, EntityId, Event, EventFilter,
    Opportunity, Shift, Volunteer,
};
use crate::query_builder::{event_search, shift_search};
use crate::row_mapper;

/// A best-effort side query that fell back to an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideFetch {
    Qualifications { opportunity_id: EntityId },
    AssignedVolunteers { shift_id: EntityId },
}

impl fmt::Display for SideFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SideFetch::Qualifications { opportunity_id } => {
                write!(f, "qualifications for opportunity {}", opportunity_id)
            }
            SideFetch::AssignedVolunteers { shift_id } => {
                write!(f, "assigned volunteers for shift {}", shift_id)
            }
        }
    }
}

/// A fetched value together with the side fetches that degraded while
/// producing it. Side-fetch failures must not block event or shift
/// visibility, but hiding them from the caller is a boundary decision, so
/// the helpers surface the list instead of swallowing it silently.
#[derive(Debug)]
pub struct Partial<T> {
    pub value: T,
    pub degraded: Vec<SideFetch>,
}

#[derive(Clone)]
pub struct SchedulerService {
    db: Arc<Database>,
}

impl SchedulerService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // Accessor for the database (health checks, seeding)
    pub fn database(&self) -> Arc<Database> {
        self.db.clone()
    }

    /// Create a volunteer. Admin-only at the API gateway.
    pub async fn create_volunteer(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> AppResult<Volunteer> {
        if first_name.trim().is_empty() || last_name.trim().is_empty() {
            return Err(AppError::Validation(
                "first and last name are required".to_string(),
            ));
        }

        let row = sqlx::query(
            "INSERT INTO volunteers (first_name, last_name, created_at) \
             VALUES ($1, $2, NOW()) RETURNING volunteer_id",
        )
        .bind(first_name)
        .bind(last_name)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| AppError::Store(format!("error creating volunteer: {}", e)))?;

        let volunteer_id: EntityId = row_mapper::column(&row, "volunteer_id")?;

        Ok(Volunteer {
            id: format_id(volunteer_id),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }

    /// Assign a volunteer to a shift. Assignment is advisory: failures come
    /// back as a structured result, never as a hard error, and assigning an
    /// already-assigned pair is a successful no-op (the unique pair
    /// constraint absorbs the duplicate).
    pub async fn assign_volunteer_to_shift(
        &self,
        shift_id: &str,
        volunteer_id: &str,
    ) -> AssignmentResult {
        let ids = parse_id("shift", shift_id).and_then(|shift| {
            parse_id("volunteer", volunteer_id).map(|volunteer| (shift, volunteer))
        });
        let (shift_id, volunteer_id) = match ids {
            Ok(ids) => ids,
            Err(e) => {
                warn!("shift assignment rejected: {}", e);
                return AssignmentResult {
                    success: false,
                    message: Some("Failed to assign volunteer to shift".to_string()),
                };
            }
        };

        let outcome = sqlx::query(
            "INSERT INTO volunteer_shifts (volunteer_id, shift_id, assigned_at, status) \
             VALUES ($1, $2, NOW(), 'confirmed') \
             ON CONFLICT (volunteer_id, shift_id) DO NOTHING",
        )
        .bind(volunteer_id)
        .bind(shift_id)
        .execute(self.db.pool())
        .await;

        match outcome {
            Ok(_) => AssignmentResult {
                success: true,
                message: Some("Volunteer successfully assigned".to_string()),
            },
            Err(e) => {
                warn!("shift assignment failed: {}", e);
                AssignmentResult {
                    success: false,
                    message: Some("Failed to assign volunteer to shift".to_string()),
                }
            }
        }
    }

    /// Create an event. Admin-only. Intentionally unimplemented; callers
    /// get an explicit signal rather than a fabricated success.
    pub async fn create_event(&self, _input: CreateEventInput) -> AppResult<Event> {
        Err(AppError::Unimplemented(
            "create_event is not implemented".to_string(),
        ))
    }

    /// Return all events matching the criteria, each with its flattened
    /// shift list. Two round trips: matching events first, then shifts for
    /// exactly those event ids with the role and date predicates reapplied.
    pub async fn get_filtered_events(&self, filter: &EventFilter) -> AppResult<Vec<Event>> {
        let query = event_search(filter);
        let rows = query
            .query()
            .fetch_all(self.db.pool())
            .await
            .map_err(|e| AppError::Store(format!("error querying events: {}", e)))?;

        let mut accumulator = EventAccumulator::new();
        for row in &rows {
            accumulator.insert(row_mapper::decode_event_row(row)?);
        }

        if !accumulator.is_empty() {
            let query = shift_search(accumulator.event_ids(), filter);
            let rows = query
                .query()
                .fetch_all(self.db.pool())
                .await
                .map_err(|e| AppError::Store(format!("error querying shifts: {}", e)))?;
            for row in &rows {
                accumulator.attach_shift(row_mapper::decode_shift_row(row)?);
            }
        }

        Ok(accumulator.into_events())
    }

    /// Return a single event with the full opportunity/shift/volunteer
    /// nesting. A missing id is NotFound, distinct from a store failure.
    pub async fn get_event_by_id(&self, id: &str) -> AppResult<Event> {
        let event_id = parse_id("event", id)?;

        let row = sqlx::query(
            "SELECT e.event_id, e.event_name, e.description, e.event_is_virtual, \
             e.location_id, l.location_name, l.street_address, l.city, l.state, l.zip_code \
             FROM events e \
             LEFT JOIN locations l ON e.location_id = l.location_id \
             WHERE e.event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(self.db.pool())
        .await
        .map_err(|e| AppError::Store(format!("error querying event: {}", e)))?
        .ok_or_else(|| AppError::NotFound(format!("event {} not found", id)))?;

        let mut event = row_mapper::decode_event_row(&row)?.into_event();

        let opportunities = self.opportunities_for_event(event_id).await?;
        for side_fetch in &opportunities.degraded {
            warn!("degraded side fetch: {}", side_fetch);
        }
        event.opportunities = opportunities.value;

        Ok(event)
    }

    /// Return volunteers holding at least one of the given qualifications,
    /// or the whole roster when no qualifications are given.
    pub async fn get_qualified_volunteers(
        &self,
        qualifications: &[String],
    ) -> AppResult<Vec<Volunteer>> {
        let rows = if qualifications.is_empty() {
            sqlx::query("SELECT volunteer_id, first_name, last_name FROM volunteers")
                .fetch_all(self.db.pool())
                .await
        } else {
            sqlx::query(
                "SELECT DISTINCT v.volunteer_id, v.first_name, v.last_name \
                 FROM volunteers v \
                 JOIN volunteer_qualifications vq ON v.volunteer_id = vq.volunteer_id \
                 WHERE vq.qualification = ANY($1)",
            )
            .bind(qualifications.to_vec())
            .fetch_all(self.db.pool())
            .await
        }
        .map_err(|e| AppError::Store(format!("error querying volunteers: {}", e)))?;

        rows.iter().map(row_mapper::decode_volunteer_row).collect()
    }

    async fn opportunities_for_event(
        &self,
        event_id: EntityId,
    ) -> AppResult<Partial<Vec<Opportunity>>> {
        let rows = sqlx::query(
            "SELECT opportunity_id, role, opportunity_is_virtual \
             FROM opportunities WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| AppError::Store(format!("error querying opportunities: {}", e)))?;

        let mut degraded = Vec::new();
        let mut opportunities = Vec::new();
        for row in &rows {
            let opportunity = row_mapper::decode_opportunity_row(row)?;

            // Best effort: a broken requirements fetch must not hide the
            // opportunity itself.
            let requires_qualifications = match self
                .qualifications_for_opportunity(opportunity.opportunity_id)
                .await
            {
                Ok(qualifications) => qualifications,
                Err(_) => {
                    degraded.push(SideFetch::Qualifications {
                        opportunity_id: opportunity.opportunity_id,
                    });
                    Vec::new()
                }
            };

            // Shifts are primary data on this path; their errors propagate.
            let shifts = self
                .shifts_for_opportunity(opportunity.opportunity_id, &mut degraded)
                .await?;

            opportunities.push(Opportunity {
                id: format_id(opportunity.opportunity_id),
                role: opportunity.role,
                is_virtual: opportunity.is_virtual,
                requires_qualifications,
                shifts,
            });
        }

        Ok(Partial {
            value: opportunities,
            degraded,
        })
    }

    async fn qualifications_for_opportunity(
        &self,
        opportunity_id: EntityId,
    ) -> AppResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT required_qualification FROM opportunity_requirements \
             WHERE opportunity_id = $1",
        )
        .bind(opportunity_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| {
            AppError::Store(format!("error querying opportunity requirements: {}", e))
        })?;

        rows.iter()
            .map(|row| row_mapper::column::<String>(row, "required_qualification"))
            .collect()
    }

    async fn shifts_for_opportunity(
        &self,
        opportunity_id: EntityId,
        degraded: &mut Vec<SideFetch>,
    ) -> AppResult<Vec<Shift>> {
        let rows = sqlx::query(
            "SELECT shift_id, shift_start, shift_end, max_volunteers \
             FROM shifts WHERE opportunity_id = $1",
        )
        .bind(opportunity_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| AppError::Store(format!("error querying shifts: {}", e)))?;

        let mut shifts = Vec::new();
        for row in &rows {
            let detail = row_mapper::decode_shift_detail_row(row)?;

            let assigned_volunteers = match self.volunteers_for_shift(detail.shift_id).await {
                Ok(volunteers) => volunteers,
                Err(_) => {
                    degraded.push(SideFetch::AssignedVolunteers {
                        shift_id: detail.shift_id,
                    });
                    Vec::new()
                }
            };

            shifts.push(detail.into_shift(assigned_volunteers));
        }

        Ok(shifts)
    }

    async fn volunteers_for_shift(&self, shift_id: EntityId) -> AppResult<Vec<Volunteer>> {
        let rows = sqlx::query(
            "SELECT v.volunteer_id, v.first_name, v.last_name \
             FROM volunteers v \
             JOIN volunteer_shifts vs ON v.volunteer_id = vs.volunteer_id \
             WHERE vs.shift_id = $1",
        )
        .bind(shift_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| AppError::Store(format!("error querying assigned volunteers: {}", e)))?;

        rows.iter().map(row_mapper::decode_volunteer_row).collect()
    }
}
