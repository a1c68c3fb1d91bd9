use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ClassSession {
    #[schema(example = "yoga_001")]
    pub id: String,
    pub name: String,
    #[schema(example = "2025-07-06")]
    pub date: String,
    #[schema(example = "07:00")]
    pub time: String,
    pub instructor: String,
    #[schema(example = "Asia/Kolkata")]
    pub timezone: String,
    pub total_slots: u32,
    pub available_slots: u32,
}

/// A class as listed to clients, with date/time optionally rendered in the
/// requested timezone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ClassView {
    pub id: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub instructor: String,
    pub timezone: String,
    pub total_slots: u32,
    pub available_slots: u32,
    pub display_date: String,
    pub display_time: String,
}

impl ClassView {
    pub fn new(session: &ClassSession, display_date: String, display_time: String) -> Self {
        Self {
            id: session.id.clone(),
            name: session.name.clone(),
            date: session.date.clone(),
            time: session.time.clone(),
            instructor: session.instructor.clone(),
            timezone: session.timezone.clone(),
            total_slots: session.total_slots,
            available_slots: session.available_slots,
            display_date,
            display_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BookingRequest {
    pub class_id: String,
    pub client_name: String,
    pub client_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Booking {
    #[schema(example = "book_001")]
    pub booking_id: String,
    pub class_id: String,
    pub client_name: String,
    pub client_email: String,
    pub booking_time: DateTime<Utc>,
}

/// A booking enriched with the referenced class as it looked at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub class_name: Option<String>,
    pub class_date: Option<String>,
    pub class_time: Option<String>,
    pub class_instructor: Option<String>,
}

impl BookingView {
    pub fn new(booking: Booking, session: Option<&ClassSession>) -> Self {
        Self {
            booking,
            class_name: session.map(|s| s.name.clone()),
            class_date: session.map(|s| s.date.clone()),
            class_time: session.map(|s| s.time.clone()),
            class_instructor: session.map(|s| s.instructor.clone()),
        }
    }
}
