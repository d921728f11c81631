pub mod campaign_key;
pub mod credential;
pub mod date_range;
pub mod money;
