pub mod calendar;
pub mod error;
pub mod money;
