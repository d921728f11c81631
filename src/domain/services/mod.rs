pub mod cost_fetcher;
pub mod hierarchy_walker;
pub mod reconciler;
