pub mod ads_gateway;
pub mod credential_store;
pub mod oauth_provider;
pub mod tracker_gateway;
