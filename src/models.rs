pub mod attendance;
pub mod auth;
pub mod billing;
pub mod customer;
pub mod dashboard;
pub mod staff;
