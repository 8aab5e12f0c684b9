pub mod payments;
pub mod results;
pub mod tasks;
pub mod uploads;
