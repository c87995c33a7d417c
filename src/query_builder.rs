// Search query composition. Filters are expressed as typed predicate
// clauses; each clause renders its SQL fragment against a shared parameter
// list, so placeholder numbering can never drift from the bound values and
// no user-supplied value is ever spliced into the SQL text.

use chrono::NaiveDate;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

use crate::models::{EntityId, EventFilter, EventType, Role};

/// A value bound to a positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Date(NaiveDate),
    TextArray(Vec<String>),
    IntArray(Vec<EntityId>),
}

/// Accumulates bound parameters and hands out their `$n` placeholders.
#[derive(Debug, Default)]
pub struct ParamList {
    params: Vec<SqlParam>,
}

impl ParamList {
    pub fn push(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("${}", self.params.len())
    }

    fn into_inner(self) -> Vec<SqlParam> {
        self.params
    }
}

/// Rendered SQL plus its positional arguments, ready to execute.
#[derive(Debug)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl SqlQuery {
    pub fn query(&self) -> Query<'_, Postgres, PgArguments> {
        let mut query = sqlx::query(self.sql.as_str());
        for param in &self.params {
            query = match param {
                SqlParam::Text(value) => query.bind(value.as_str()),
                SqlParam::Date(value) => query.bind(*value),
                SqlParam::TextArray(values) => query.bind(values.clone()),
                SqlParam::IntArray(values) => query.bind(values.clone()),
            };
        }
        query
    }
}

/// WHERE clause fragments for the event/shift searches. Table aliases are
/// shared between the two queries: `e` events, `l` locations, `opp`
/// opportunities, `sh` shifts.
#[derive(Debug, Clone)]
pub enum Predicate {
    CityIn(Vec<String>),
    Modality(EventType),
    RoleIn(Vec<Role>),
    ShiftStartOnOrAfter(NaiveDate),
    ShiftStartOnOrBefore(NaiveDate),
    EventIdIn(Vec<EntityId>),
}

impl Predicate {
    fn render(self, params: &mut ParamList) -> String {
        match self {
            Predicate::CityIn(cities) => {
                format!("l.city = ANY({})", params.push(SqlParam::TextArray(cities)))
            }
            // Modality predicates only inspect stored flags; nothing to bind.
            Predicate::Modality(EventType::Virtual) => {
                "e.event_is_virtual = true AND e.location_id IS NULL".to_string()
            }
            Predicate::Modality(EventType::InPerson) => "e.event_is_virtual = false".to_string(),
            Predicate::Modality(EventType::Hybrid) => {
                "e.event_is_virtual = true AND e.location_id IS NOT NULL".to_string()
            }
            Predicate::RoleIn(roles) => {
                let stored: Vec<String> = roles.iter().map(|role| role.storage_value()).collect();
                format!("opp.role = ANY({})", params.push(SqlParam::TextArray(stored)))
            }
            Predicate::ShiftStartOnOrAfter(date) => {
                format!("sh.shift_start >= {}", params.push(SqlParam::Date(date)))
            }
            Predicate::ShiftStartOnOrBefore(date) => {
                format!("sh.shift_start <= {}", params.push(SqlParam::Date(date)))
            }
            Predicate::EventIdIn(ids) => {
                format!("opp.event_id = ANY({})", params.push(SqlParam::IntArray(ids)))
            }
        }
    }
}

/// Consuming builder for SELECT statements over the scheduler schema.
#[derive(Debug)]
pub struct SelectBuilder {
    select: String,
    from: String,
    joins: Vec<String>,
    conditions: Vec<String>,
    params: ParamList,
}

impl SelectBuilder {
    pub fn new(select: &str, from: &str) -> Self {
        Self {
            select: select.to_string(),
            from: from.to_string(),
            joins: Vec::new(),
            conditions: Vec::new(),
            params: ParamList::default(),
        }
    }

    pub fn join(mut self, fragment: &str) -> Self {
        self.joins.push(fragment.to_string());
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        let clause = predicate.render(&mut self.params);
        self.conditions.push(clause);
        self
    }

    pub fn build(self) -> SqlQuery {
        let mut sql = format!("SELECT {} FROM {}", self.select, self.from);
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        SqlQuery {
            sql,
            params: self.params.into_inner(),
        }
    }
}

const EVENT_COLUMNS: &str = "DISTINCT e.event_id, e.event_name, e.description, \
     e.event_is_virtual, e.location_id, l.location_name, l.street_address, \
     l.city, l.state, l.zip_code";

/// Compose the primary event search. Locations and opportunities are always
/// left-joined so events without a venue still match and role restrictions
/// can apply; the shift join is only added when a date bound is present.
pub fn event_search(filter: &EventFilter) -> SqlQuery {
    let mut builder = SelectBuilder::new(EVENT_COLUMNS, "events e")
        .join("LEFT JOIN locations l ON e.location_id = l.location_id")
        .join("LEFT JOIN opportunities opp ON e.event_id = opp.event_id");

    if filter.has_date_bounds() {
        // Shift timing goes through its own opportunity join so the date
        // window and the role restriction stay independent: an event matches
        // when any opportunity fits the role and any shift fits the window.
        builder = builder
            .join("LEFT JOIN opportunities opp_window ON e.event_id = opp_window.event_id")
            .join("LEFT JOIN shifts sh ON opp_window.opportunity_id = sh.opportunity_id");
    }

    if !filter.cities.is_empty() {
        builder = builder.filter(Predicate::CityIn(filter.cities.clone()));
    }

    if let Some(event_type) = filter.event_type {
        builder = builder.filter(Predicate::Modality(event_type));
    }

    if !filter.roles.is_empty() {
        builder = builder.filter(Predicate::RoleIn(filter.roles.clone()));
    }

    if let Some(start) = filter.start_date {
        builder = builder.filter(Predicate::ShiftStartOnOrAfter(start));
    }

    if let Some(end) = filter.end_date {
        builder = builder.filter(Predicate::ShiftStartOnOrBefore(end));
    }

    builder.build()
}

/// Compose the follow-up shift fetch for the exact filtered event-id set,
/// re-applying the role and date predicates so only matching shifts attach.
pub fn shift_search(event_ids: Vec<EntityId>, filter: &EventFilter) -> SqlQuery {
    let mut builder = SelectBuilder::new(
        "sh.shift_id, sh.shift_start, sh.shift_end, opp.role, opp.event_id",
        "shifts sh",
    )
    .join("JOIN opportunities opp ON sh.opportunity_id = opp.opportunity_id")
    .filter(Predicate::EventIdIn(event_ids));

    if let Some(start) = filter.start_date {
        builder = builder.filter(Predicate::ShiftStartOnOrAfter(start));
    }

    if let Some(end) = filter.end_date {
        builder = builder.filter(Predicate::ShiftStartOnOrBefore(end));
    }

    if !filter.roles.is_empty() {
        builder = builder.filter(Predicate::RoleIn(filter.roles.clone()));
    }

    builder.build()
}
