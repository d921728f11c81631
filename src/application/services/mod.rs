pub mod report_service;
