//! Movie collections API.
//!
//! Proxies a third-party movie catalog through a retrying client and stores
//! user-owned movie collections, ranking each user's favourite genres.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
