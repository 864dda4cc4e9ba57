//! Inkpost - a small blog backend
//!
//! This library provides user authentication, session management and blog
//! post storage for the Inkpost server.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
