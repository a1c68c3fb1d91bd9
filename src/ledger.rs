use crate::models::Booking;

#[derive(Debug, Clone, Default)]
pub struct BookingLedger {
    bookings: Vec<Booking>,
    issued: u64,
}

impl BookingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next booking id. Ids are never handed out twice, even
    /// if the booking they were issued for is never appended.
    pub fn next_id(&mut self) -> String {
        self.issued += 1;
        format!("book_{:03}", self.issued)
    }

    pub fn append(&mut self, booking: Booking) {
        self.bookings.push(booking);
    }

    pub fn find_by_email(&self, email: &str) -> Vec<&Booking> {
        let wanted = email.to_lowercase();
        self.bookings
            .iter()
            .filter(|b| b.client_email.to_lowercase() == wanted)
            .collect()
    }

    pub fn count_for_class(&self, class_id: &str) -> usize {
        self.bookings.iter().filter(|b| b.class_id == class_id).count()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}
