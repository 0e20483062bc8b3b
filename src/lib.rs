pub mod aggregate;
pub mod config;
pub mod fetch;
pub mod http_client;
pub mod memo;
pub mod provider;
pub mod roster;
pub mod session;
pub mod state;
pub mod stats_api;
