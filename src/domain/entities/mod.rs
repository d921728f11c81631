pub mod account;
pub mod report;
pub mod revenue;
pub mod spend;
