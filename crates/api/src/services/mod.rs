//! Application services composed from the core rules and the stores.

pub mod availability;

pub use availability::AvailabilityService;
