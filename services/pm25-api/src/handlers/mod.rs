//! HTTP request handlers for the PM2.5 API.

pub mod data;
pub mod health;
pub mod stats;
