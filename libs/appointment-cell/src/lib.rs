pub mod models;
pub mod services;

pub use models::*;
pub use services::booking::BookingService;
pub use services::store::{AppointmentStore, InMemoryAppointmentStore};
