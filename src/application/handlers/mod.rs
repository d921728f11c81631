pub mod api_error;
pub mod auth_handler;
pub mod report_handler;
