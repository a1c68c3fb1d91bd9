use utoipa::OpenApi;

use crate::models::{Booking, BookingRequest, BookingView, ClassSession, ClassView};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fitness Studio Booking API",
        description = "View upcoming fitness classes and book a spot."
    ),
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::get_classes,
        crate::handlers::get_classes_ical,
        crate::handlers::book_class,
        crate::handlers::get_bookings
    ),
    components(schemas(ClassSession, ClassView, BookingRequest, Booking, BookingView)),
    tags(
        (name = "studio", description = "Service status"),
        (name = "classes", description = "Class schedule"),
        (name = "bookings", description = "Class reservations")
    )
)]
pub struct ApiDoc;
