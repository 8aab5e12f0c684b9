//! Domain types, enums, and validation rules shared by every photoedit crate.
//!
//! Nothing in here touches the network or the database.

pub mod error;
pub mod image_edit;
pub mod payments;
pub mod types;
pub mod uploads;
