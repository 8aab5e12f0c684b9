//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize`-free insert DTO built by the service layer

pub mod image_edit;
pub mod status;
pub mod upload;
