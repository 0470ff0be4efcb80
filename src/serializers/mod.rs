//! Wire representations: request payloads and list/detail response shapes.

pub mod catalog;
pub mod fields;
pub mod performance;
pub mod play;
pub mod reservation;
