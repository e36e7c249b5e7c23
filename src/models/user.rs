use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Record;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Farmer,
    Consumer,
    Delivery,
    Admin,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VehicleType {
    Bike,
    Auto,
    Truck,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vehicle {
    pub kind: VehicleType,
    pub name: String,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub village: Option<String>,
    /// Rolling rating, only tracked for delivery partners.
    pub rating: Option<f64>,
    pub vehicle: Option<Vehicle>,
    pub created_at: DateTime<Utc>,
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }
}
