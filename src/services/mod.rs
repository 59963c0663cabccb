// src/services/mod.rs
pub mod assistant;
pub mod language;
pub mod session;
pub mod store;
