use chrono::Duration;
use icalendar::{Calendar, Component, Event, EventLike};
use tracing::warn;

use crate::catalog::session_start;
use crate::models::ClassSession;

#[derive(Clone, Default)]
pub struct ICalExporter;

impl ICalExporter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, calendar_name: &str, sessions: &[ClassSession]) -> Vec<u8> {
        if sessions.is_empty() {
            return Vec::new();
        }

        let mut calendar = Calendar::new();
        calendar.name(calendar_name);

        for session in sessions {
            let start = match session_start(session) {
                Ok(start) => start,
                Err(err) => {
                    warn!(class_id = %session.id, error = %err, "class left out of calendar");
                    continue;
                }
            };

            let mut event = Event::new();
            event.summary(&session.name);
            event.starts(start);
            event.ends(start + Duration::hours(1));
            event.location(calendar_name);
            event.description(&format!(
                "Instructor: {}\nAvailable slots: {}/{}",
                session.instructor, session.available_slots, session.total_slots
            ));
            event.uid(&format!("{}-fitness-booking", session.id));
            calendar.push(event);
        }

        calendar.to_string().into_bytes()
    }
}
