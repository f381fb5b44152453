pub mod attendance_service;
pub mod auth;
pub mod billing_rules;
pub mod billing_service;
pub mod customer_service;
pub mod dashboard_service;
pub mod staff_service;
