//! Data models for the identity service

mod user;

pub use user::{NewUser, User};
