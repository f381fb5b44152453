pub mod attendance;
pub mod billing;
pub mod customers;
pub mod dashboard;
pub mod staff;
