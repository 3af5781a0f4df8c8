// Core game logic modules
pub mod core;

// Shared document store
pub mod store;

// Authentication
pub mod auth;

// Services (pure rules)
pub mod services;

// API models (requests/responses)
pub mod models;

// HTTP routes
pub mod routes;

// Configuration
pub mod config;

// Error types
pub mod error;

// Application state
pub mod state;
