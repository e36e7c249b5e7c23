use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Role, User, VehicleType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryActor {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub vehicle: Option<VehicleType>,
}

/// The party requesting a change, with just enough identity to authorize it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    Farmer { id: Uuid },
    Consumer { id: Uuid },
    Delivery(DeliveryActor),
    Admin { id: Uuid },
}

impl Actor {
    pub fn from_user(user: &User) -> Self {
        match user.role {
            Role::Farmer => Actor::Farmer { id: user.id },
            Role::Consumer => Actor::Consumer { id: user.id },
            Role::Delivery => Actor::Delivery(DeliveryActor {
                id: user.id,
                name: user.name.clone(),
                phone: user.phone.clone(),
                vehicle: user.vehicle.as_ref().map(|vehicle| vehicle.kind),
            }),
            Role::Admin => Actor::Admin { id: user.id },
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Actor::Farmer { id } | Actor::Consumer { id } | Actor::Admin { id } => *id,
            Actor::Delivery(delivery) => delivery.id,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Actor::Farmer { .. } => Role::Farmer,
            Actor::Consumer { .. } => Role::Consumer,
            Actor::Delivery(_) => Role::Delivery,
            Actor::Admin { .. } => Role::Admin,
        }
    }
}
