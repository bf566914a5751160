//! Exercise catalog model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog exercise, read-mostly reference data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
}
