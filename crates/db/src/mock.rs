//! Test doubles for the store traits: mockall mocks for scripting failures,
//! and an in-memory store with the same atomicity as the Postgres one.

pub mod memory;
pub mod repositories;

pub use memory::InMemoryStore;
