use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{ClassCatalog, session_start};
use crate::ledger::BookingLedger;
use crate::models::{Booking, BookingView, ClassSession, ClassView};
use crate::timezone::{Conversion, TimezoneError, convert};
use crate::validation::{is_valid_client_name, is_valid_email};

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("Class with ID '{0}' not found.")]
    NotFound(String),
    #[error("No slots available for class '{0}'.")]
    NoCapacity(String),
    #[error("Cannot book class '{0}' as it is in the past.")]
    PastEvent(String),
    #[error("Invalid date/time stored for class '{class_id}': {source}")]
    InternalData {
        class_id: String,
        source: TimezoneError,
    },
}

#[derive(Debug)]
struct Store {
    catalog: ClassCatalog,
    ledger: BookingLedger,
}

/// Owns the class table, the booking ledger and the id counter behind one
/// lock. Bookings hold the write lock from the availability check until the
/// ledger append.
#[derive(Debug)]
pub struct BookingService {
    store: RwLock<Store>,
}

impl BookingService {
    pub fn new(catalog: ClassCatalog) -> Self {
        Self {
            store: RwLock::new(Store {
                catalog,
                ledger: BookingLedger::new(),
            }),
        }
    }

    // Nothing is written before every check passes, so a poisoned lock
    // still guards a consistent store.
    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn book(
        &self,
        class_id: &str,
        client_name: &str,
        client_email: &str,
        now: DateTime<Utc>,
    ) -> Result<BookingView, BookingError> {
        validate_client(client_name, client_email)?;

        let mut store = self.write();
        let session = store
            .catalog
            .find_by_id(class_id)
            .ok_or_else(|| BookingError::NotFound(class_id.to_string()))?;

        let class_name = session.name.clone();
        if session.available_slots == 0 {
            return Err(BookingError::NoCapacity(class_name));
        }

        let start = session_start(session).map_err(|source| BookingError::InternalData {
            class_id: class_id.to_string(),
            source,
        })?;
        if start < now {
            return Err(BookingError::PastEvent(class_name));
        }

        let Store { catalog, ledger } = &mut *store;
        if !catalog.reserve_slot(class_id) {
            return Err(BookingError::NoCapacity(class_name));
        }
        let booking = Booking {
            booking_id: ledger.next_id(),
            class_id: class_id.to_string(),
            client_name: client_name.to_string(),
            client_email: client_email.to_string(),
            booking_time: now,
        };
        ledger.append(booking.clone());
        info!(
            booking_id = %booking.booking_id,
            class_id,
            "booking created"
        );

        Ok(BookingView::new(booking, catalog.find_by_id(class_id)))
    }

    pub fn list_by_email(&self, client_email: &str) -> Result<Vec<BookingView>, BookingError> {
        if !is_valid_email(client_email) {
            return Err(invalid_email());
        }
        let store = self.read();
        Ok(store
            .ledger
            .find_by_email(client_email)
            .into_iter()
            .map(|booking| {
                BookingView::new(booking.clone(), store.catalog.find_by_id(&booking.class_id))
            })
            .collect())
    }

    pub fn upcoming_sessions(&self, now: DateTime<Utc>) -> Vec<ClassSession> {
        self.read()
            .catalog
            .list_upcoming(now)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Upcoming classes with display fields rendered in `target_timezone`
    /// when given, otherwise equal to the stored date and time.
    pub fn upcoming_classes(
        &self,
        now: DateTime<Utc>,
        target_timezone: Option<&str>,
    ) -> Vec<ClassView> {
        let store = self.read();
        store
            .catalog
            .list_upcoming(now)
            .into_iter()
            .map(|session| {
                let (display_date, display_time) = match target_timezone {
                    Some(target) => display_in(session, target),
                    None => (session.date.clone(), session.time.clone()),
                };
                ClassView::new(session, display_date, display_time)
            })
            .collect()
    }

    pub fn class(&self, class_id: &str) -> Option<ClassSession> {
        self.read().catalog.find_by_id(class_id).cloned()
    }

    pub fn bookings_for_class(&self, class_id: &str) -> usize {
        self.read().ledger.count_for_class(class_id)
    }
}

fn display_in(session: &ClassSession, target: &str) -> (String, String) {
    match convert(&session.date, &session.time, &session.timezone, target) {
        Conversion::Converted { date, time } => (date, time),
        Conversion::FallbackOriginal { date, time, reason } => {
            warn!(
                class_id = %session.id,
                target_timezone = target,
                error = %reason,
                "timezone conversion failed, showing original time"
            );
            (date, time)
        }
    }
}

fn invalid_email() -> BookingError {
    BookingError::InvalidInput("Invalid client email format.".into())
}

fn validate_client(client_name: &str, client_email: &str) -> Result<(), BookingError> {
    if !is_valid_client_name(client_name) {
        return Err(BookingError::InvalidInput(
            "Client name cannot be empty.".into(),
        ));
    }
    if !is_valid_email(client_email) {
        return Err(invalid_email());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;

    fn before_seed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap()
    }

    fn service_with_slots(class_id: &str, slots: u32) -> BookingService {
        let catalog = ClassCatalog::seed();
        let sessions = ["yoga_001", "zumba_001", "hiit_001", "yoga_002"]
            .iter()
            .filter_map(|id| catalog.find_by_id(id).cloned())
            .map(|mut s| {
                if s.id == class_id {
                    s.total_slots = slots;
                    s.available_slots = slots;
                }
                s
            })
            .collect();
        BookingService::new(ClassCatalog::new(sessions).unwrap())
    }

    fn assert_slot_invariant(service: &BookingService, class_id: &str) {
        let session = service.class(class_id).unwrap();
        let booked = service.bookings_for_class(class_id) as u32;
        assert!(session.available_slots <= session.total_slots);
        assert_eq!(session.available_slots, session.total_slots - booked);
    }

    #[test]
    fn test_book_yoga_scenario() {
        let service = BookingService::new(ClassCatalog::seed());
        let now = before_seed();

        let view = service
            .book("yoga_001", "Test User", "test@example.com", now)
            .unwrap();

        assert_eq!(view.booking.booking_id, "book_001");
        assert_eq!(view.booking.booking_time, now);
        assert_eq!(view.class_name.as_deref(), Some("Morning Yoga Flow"));
        assert_eq!(view.class_instructor.as_deref(), Some("Priya Sharma"));
        assert_eq!(service.class("yoga_001").unwrap().available_slots, 9);
        assert_slot_invariant(&service, "yoga_001");
    }

    #[test]
    fn test_book_last_slot_then_no_capacity() {
        let service = service_with_slots("zumba_001", 2);
        let now = before_seed();

        service.book("zumba_001", "User 1", "user1@example.com", now).unwrap();
        let second = service.book("zumba_001", "User 2", "user2@example.com", now).unwrap();
        assert_eq!(second.booking.booking_id, "book_002");
        assert_eq!(service.class("zumba_001").unwrap().available_slots, 0);

        let err = service
            .book("zumba_001", "User 3", "user3@example.com", now)
            .unwrap_err();
        assert!(matches!(err, BookingError::NoCapacity(ref name) if name == "High-Energy Zumba"));
        assert_eq!(service.bookings_for_class("zumba_001"), 2);
        assert_slot_invariant(&service, "zumba_001");

        // The rejected attempt did not consume an id.
        let next = service.book("hiit_001", "User 4", "user4@example.com", now).unwrap();
        assert_eq!(next.booking.booking_id, "book_003");
    }

    #[test]
    fn test_book_full_session_allocates_no_id() {
        let service = service_with_slots("hiit_001", 0);
        let err = service
            .book("hiit_001", "Test User", "test@example.com", before_seed())
            .unwrap_err();
        assert!(matches!(err, BookingError::NoCapacity(_)));

        let view = service
            .book("yoga_001", "Test User", "test@example.com", before_seed())
            .unwrap();
        assert_eq!(view.booking.booking_id, "book_001");
    }

    #[test]
    fn test_book_unknown_class() {
        let service = BookingService::new(ClassCatalog::seed());
        let err = service
            .book("non_existent", "Test User", "test@example.com", before_seed())
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound(ref id) if id == "non_existent"));
        assert!(err.to_string().contains("not found"));
        assert!(service.list_by_email("test@example.com").unwrap().is_empty());
    }

    #[test]
    fn test_book_past_event() {
        let service = BookingService::new(ClassCatalog::seed());
        // One minute after yoga_001 started (01:30 UTC).
        let now = Utc.with_ymd_and_hms(2025, 7, 6, 1, 31, 0).unwrap();
        let err = service
            .book("yoga_001", "Test User", "test@example.com", now)
            .unwrap_err();
        assert!(matches!(err, BookingError::PastEvent(_)));
        assert_eq!(service.class("yoga_001").unwrap().available_slots, 10);

        // Booking exactly at the start instant is still allowed.
        let at_start = Utc.with_ymd_and_hms(2025, 7, 6, 1, 30, 0).unwrap();
        assert!(service.book("yoga_001", "Test User", "test@example.com", at_start).is_ok());
    }

    #[test]
    fn test_book_validation_order() {
        let service = BookingService::new(ClassCatalog::seed());
        let now = before_seed();

        let err = service.book("non_existent", "   ", "bad", now).unwrap_err();
        assert_eq!(err.to_string(), "Client name cannot be empty.");

        let err = service.book("non_existent", "Test User", "bad", now).unwrap_err();
        assert_eq!(err.to_string(), "Invalid client email format.");

        let err = service
            .book("non_existent", "Test User", "test@example.com", now)
            .unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[test]
    fn test_book_corrupt_schedule_is_internal_error() {
        let mut session = ClassCatalog::seed().find_by_id("yoga_001").cloned().unwrap();
        session.date = "06/07/2025".to_string();
        let service = BookingService::new(ClassCatalog::new(vec![session]).unwrap());

        let err = service
            .book("yoga_001", "Test User", "test@example.com", before_seed())
            .unwrap_err();
        assert!(matches!(err, BookingError::InternalData { .. }));
        assert_eq!(service.class("yoga_001").unwrap().available_slots, 10);
    }

    #[test]
    fn test_list_by_email_case_insensitive_and_enriched() {
        let service = BookingService::new(ClassCatalog::seed());
        let now = before_seed();
        service.book("yoga_001", "Finder", "User@Example.com", now).unwrap();
        service.book("hiit_001", "Someone", "other@example.com", now).unwrap();
        service.book("yoga_002", "Finder", "user@example.com", now).unwrap();

        let views = service.list_by_email("user@example.com").unwrap();
        let ids: Vec<_> = views.iter().map(|v| v.booking.booking_id.as_str()).collect();
        assert_eq!(ids, ["book_001", "book_003"]);
        assert_eq!(views[0].booking.client_email, "User@Example.com");
        assert_eq!(views[0].class_name.as_deref(), Some("Morning Yoga Flow"));
        assert_eq!(views[1].class_time.as_deref(), Some("19:00"));

        assert!(service.list_by_email("nobody@example.com").unwrap().is_empty());
        assert!(matches!(
            service.list_by_email("bademail"),
            Err(BookingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_booking_view_without_session() {
        let booking = Booking {
            booking_id: "book_042".to_string(),
            class_id: "gone_001".to_string(),
            client_name: "Test User".to_string(),
            client_email: "test@example.com".to_string(),
            booking_time: before_seed(),
        };
        let view = BookingView::new(booking, None);
        assert!(view.class_name.is_none());
        assert!(view.class_date.is_none());
        assert!(view.class_time.is_none());
        assert!(view.class_instructor.is_none());
    }

    #[test]
    fn test_upcoming_classes_display_fields() {
        let service = BookingService::new(ClassCatalog::seed());
        let now = before_seed();

        for view in service.upcoming_classes(now, None) {
            assert_eq!(view.display_date, view.date);
            assert_eq!(view.display_time, view.time);
        }

        let converted = service.upcoming_classes(now, Some("America/New_York"));
        assert_eq!(converted.len(), 4);
        assert_eq!(converted[0].display_date, "2025-07-05");
        assert_eq!(converted[0].display_time, "21:30");
        assert_eq!(converted[0].date, "2025-07-06");

        let fallback = service.upcoming_classes(now, Some("Not/A_Zone"));
        assert_eq!(fallback[0].display_time, "07:00");
    }

    #[test]
    fn test_concurrent_bookings_do_not_overbook() {
        let service = Arc::new(service_with_slots("hiit_001", 3));
        let now = before_seed();

        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|i| {
                    let service = Arc::clone(&service);
                    scope.spawn(move || {
                        service.book("hiit_001", "Racer", &format!("racer{i}@example.com"), now)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 3);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, BookingError::NoCapacity(_))));
        assert_slot_invariant(&service, "hiit_001");
    }
}
