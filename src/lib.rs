// Library crate for integration tests.
// main.rs has its own mod declarations; this re-exports all modules.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod models;
pub mod notify;
pub mod panel;
pub mod render;
pub mod session;
pub mod storage;
