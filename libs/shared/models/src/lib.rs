pub mod channel;
pub mod error;

pub use channel::{AppointmentKind, Channel};
pub use error::AppError;
