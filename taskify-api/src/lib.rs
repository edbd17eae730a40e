//! # Taskify API Server Library
//!
//! This library provides the core functionality for the Taskify API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `help`: Client for the AI help assistant backend
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod help;
pub mod routes;
