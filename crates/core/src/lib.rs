//! # MentorMesh Core
//!
//! Domain types and pure scheduling logic for the MentorMesh availability
//! service: slots and their booking state machine, overlap detection,
//! request validation, meeting links and the error taxonomy shared by the
//! store and API crates.

pub mod booking;
pub mod clock;
pub mod errors;
pub mod meeting;
pub mod models;
pub mod overlap;
pub mod time;
pub mod validation;
