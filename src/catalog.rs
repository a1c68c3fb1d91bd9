use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::ClassSession;
use crate::timezone::{TimezoneError, start_instant};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid seed file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate class id: {0}")]
    DuplicateId(String),
    #[error("Class {id} has {available} available slots but only {total} in total")]
    SlotsExceedTotal { id: String, available: u32, total: u32 },
}

#[derive(Debug, Clone, Default)]
pub struct ClassCatalog {
    sessions: Vec<ClassSession>,
}

impl ClassCatalog {
    pub fn new(sessions: Vec<ClassSession>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for session in &sessions {
            if !seen.insert(session.id.as_str()) {
                return Err(CatalogError::DuplicateId(session.id.clone()));
            }
            if session.available_slots > session.total_slots {
                return Err(CatalogError::SlotsExceedTotal {
                    id: session.id.clone(),
                    available: session.available_slots,
                    total: session.total_slots,
                });
            }
        }
        Ok(Self { sessions })
    }

    /// Studio schedule used when no seed file is configured.
    pub fn seed() -> Self {
        let session = |id: &str, name: &str, date: &str, time: &str, instructor: &str, slots| {
            ClassSession {
                id: id.to_string(),
                name: name.to_string(),
                date: date.to_string(),
                time: time.to_string(),
                instructor: instructor.to_string(),
                timezone: "Asia/Kolkata".to_string(),
                total_slots: slots,
                available_slots: slots,
            }
        };
        Self {
            sessions: vec![
                session("yoga_001", "Morning Yoga Flow", "2025-07-06", "07:00", "Priya Sharma", 10),
                session("zumba_001", "High-Energy Zumba", "2025-07-06", "18:30", "Amit Singh", 15),
                session("hiit_001", "HIIT Blast", "2025-07-07", "09:00", "Rajesh Kumar", 8),
                session(
                    "yoga_002",
                    "Evening Restorative Yoga",
                    "2025-07-07",
                    "19:00",
                    "Priya Sharma",
                    12,
                ),
            ],
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let sessions: Vec<ClassSession> = serde_json::from_str(&raw)?;
        Self::new(sessions)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&ClassSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// Sessions starting at or after `now`, in catalog order.
    pub fn list_upcoming(&self, now: DateTime<Utc>) -> Vec<&ClassSession> {
        self.sessions
            .iter()
            .filter(|session| match session_start(session) {
                Ok(start) => start >= now,
                Err(err) => {
                    warn!(class_id = %session.id, error = %err, "skipping class with invalid schedule");
                    false
                }
            })
            .collect()
    }

    pub fn reserve_slot(&mut self, id: &str) -> bool {
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) if session.available_slots > 0 => {
                session.available_slots -= 1;
                debug!(class_id = id, remaining = session.available_slots, "slot reserved");
                true
            }
            _ => false,
        }
    }
}

pub fn session_start(session: &ClassSession) -> Result<DateTime<Utc>, TimezoneError> {
    start_instant(&session.date, &session.time, &session.timezone)
}
