//! API models for entities, request and response payloads

pub mod exercise;
pub mod workout;
