pub mod entities;

pub use entities::{User, UserRole, UserStatus};
