use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Record;

/// A farmer's catalog listing. Never edited in place; a new price or
/// quantity means a new listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub farmer_name: String,
    pub farmer_village: String,
    pub name: String,
    pub price_per_kg: f64,
    pub quantity_available: f64,
    pub category: String,
    pub description: String,
    pub listed_at: DateTime<Utc>,
}

impl Record for Product {
    fn id(&self) -> Uuid {
        self.id
    }
}
