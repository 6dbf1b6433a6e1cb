pub mod application_service;
pub mod report_service;
pub mod transition_service;
