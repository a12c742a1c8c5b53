// src/services/mod.rs
pub mod ai;
pub mod config;
pub mod conversation;
pub mod image;
pub mod render;
pub mod response;
pub mod retry;
