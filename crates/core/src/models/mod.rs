pub mod availability;
pub mod envelope;
pub mod slot;
pub mod user;
