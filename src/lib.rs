pub mod backend;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod logging;
pub mod service;
pub mod split;
pub mod store;
pub mod summary;
