pub mod api_client;
pub mod chart_builder;
pub mod scan_poller;
pub mod store;
