pub mod models;
pub mod services;

pub use models::*;
pub use services::availability::AvailabilityService;
pub use services::calendar::{CalendarApi, HttpCalendarClient};
