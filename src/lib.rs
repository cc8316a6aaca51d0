//! Spy cat agency: cats, the missions they run, and the targets within each
//! mission, served over a small REST API.
//!
//! The interesting part is [`services`], which enforces the mission, target
//! and cat lifecycle on top of the SQLite store in [`db`].

pub mod api;
pub mod breeds;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::{Error, Result};
