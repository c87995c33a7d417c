// Nested event graph assembly. The filtered search runs two round trips
// (events, then shifts for exactly those events); this accumulator merges
// the second wave of rows into the first while keeping the result order
// deterministic.

use std::collections::HashMap;

use crate::models::{EntityId, Event};
use crate::row_mapper::{EventRow, ShiftRow};

/// Ordered map of events keyed by their native id. The event query can
/// return the same event once per matching opportunity; the first row wins
/// and later duplicates are discarded. Output order is first-seen order.
#[derive(Debug, Default)]
pub struct EventAccumulator {
    order: Vec<EntityId>,
    events: HashMap<EntityId, Event>,
}

impl EventAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: EventRow) {
        if self.events.contains_key(&row.event_id) {
            return;
        }
        self.order.push(row.event_id);
        self.events.insert(row.event_id, row.into_event());
    }

    /// Append a shift to its owning event, in delivery order. Rows that
    /// reference an event outside the accumulated set are dropped; the
    /// follow-up query is scoped to the filtered ids, so such rows only
    /// appear when the store changes between the two round trips.
    pub fn attach_shift(&mut self, row: ShiftRow) {
        if let Some(event) = self.events.get_mut(&row.event_id) {
            event.shifts.push(row.into_shift());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn event_ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }

    pub fn into_events(self) -> Vec<Event> {
        let EventAccumulator { order, mut events } = self;
        order
            .into_iter()
            .filter_map(|id| events.remove(&id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, Location, Role};
    use chrono::{TimeZone, Utc};

    fn event_row(event_id: EntityId, name: &str, city: Option<&str>) -> EventRow {
        EventRow {
            event_id,
            name: name.to_string(),
            description: None,
            is_virtual: false,
            location_id: city.map(|_| 1),
            location: city.map(|city| Location {
                name: None,
                address: "100 Main St".to_string(),
                city: city.to_string(),
                state: "TX".to_string(),
                zip_code: None,
            }),
        }
    }

    fn shift_row(shift_id: EntityId, event_id: EntityId) -> ShiftRow {
        ShiftRow {
            shift_id,
            event_id,
            role: Role::EventSupport,
            start: Utc.with_ymd_and_hms(2025, 8, 10, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 8, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_first_event_row_wins() {
        let mut accumulator = EventAccumulator::new();
        accumulator.insert(event_row(7, "Cleanup", Some("Austin")));
        // Duplicate id from a second matching opportunity; different
        // payload to prove the later row is discarded.
        accumulator.insert(event_row(7, "Cleanup (dup)", None));

        let events = accumulator.into_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Cleanup");
        assert!(events[0].location.is_some());
    }

    #[test]
    fn test_output_preserves_first_seen_order() {
        let mut accumulator = EventAccumulator::new();
        for id in [9, 3, 12, 3, 9] {
            accumulator.insert(event_row(id, "Event", None));
        }

        assert_eq!(accumulator.event_ids(), vec![9, 3, 12]);
        let ids: Vec<String> = accumulator
            .into_events()
            .into_iter()
            .map(|event| event.id)
            .collect();
        assert_eq!(ids, vec!["9", "3", "12"]);
    }

    #[test]
    fn test_shifts_attach_in_delivery_order() {
        let mut accumulator = EventAccumulator::new();
        accumulator.insert(event_row(7, "Cleanup", None));
        accumulator.insert(event_row(8, "Gala", None));

        accumulator.attach_shift(shift_row(31, 7));
        accumulator.attach_shift(shift_row(32, 8));
        accumulator.attach_shift(shift_row(30, 7));

        let events = accumulator.into_events();
        let shift_ids: Vec<&str> = events[0].shifts.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(shift_ids, vec!["31", "30"]);
        assert_eq!(events[1].shifts.len(), 1);
    }

    #[test]
    fn test_unmatched_shift_rows_are_dropped() {
        let mut accumulator = EventAccumulator::new();
        accumulator.insert(event_row(7, "Cleanup", None));

        accumulator.attach_shift(shift_row(40, 999));

        let events = accumulator.into_events();
        assert!(events[0].shifts.is_empty());
    }

    #[test]
    fn test_events_without_shifts_keep_empty_sequence() {
        let mut accumulator = EventAccumulator::new();
        accumulator.insert(event_row(5, "Orientation", None));

        let events = accumulator.into_events();
        assert_eq!(events[0].event_type, EventType::InPerson);
        assert!(events[0].shifts.is_empty());
    }
}
