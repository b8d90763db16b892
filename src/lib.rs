pub mod client;
pub mod error;
pub mod import;
pub mod models;
pub mod views;
