pub mod models;
pub mod services;

pub use models::*;
pub use services::intent::classify;
pub use services::session::SessionStore;
