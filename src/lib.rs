pub mod config;
pub mod models;
pub mod notifications;
pub mod store;
pub mod worker;
