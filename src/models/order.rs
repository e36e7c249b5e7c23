use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::VehicleType;
use crate::store::Record;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Accepted,
    DriverAssigned,
    PickedUp,
    Delivered,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::DriverAssigned => "DRIVER_ASSIGNED",
            OrderStatus::PickedUp => "PICKED_UP",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Rejected => "REJECTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Rejected)
    }
}

/// Payment rails a consumer can pick. Checkout only offers UPI and CASH; the
/// other methods appear once a consumer pays through the gateway.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "CARD")]
    Card,
    #[serde(rename = "NET")]
    NetBanking,
    #[serde(rename = "WALLET")]
    Wallet,
    #[serde(rename = "CASH")]
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Card => "CARD",
            PaymentMethod::NetBanking => "NET",
            PaymentMethod::Wallet => "WALLET",
            PaymentMethod::Cash => "CASH",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumerParty {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmerParty {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub village: Option<String>,
}

/// Delivery partner attached to an order by a successful claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryParty {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub vehicle: VehicleType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub reference: u64,
    pub consumer: ConsumerParty,
    pub farmer: FarmerParty,
    pub delivery_partner: Option<DeliveryParty>,
    pub items: Vec<LineItem>,
    pub total_amount: f64,
    pub delivery_cost: f64,
    pub distance_km: f64,
    pub address: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub rating: Option<u8>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn partner_id(&self) -> Option<Uuid> {
        self.delivery_partner.as_ref().map(|partner| partner.id)
    }

    /// Paid up front, or settled in cash at the door.
    pub fn payment_settled_or_cash(&self) -> bool {
        self.payment_status == PaymentStatus::Paid || self.payment_method == PaymentMethod::Cash
    }

    pub fn is_claimable(&self) -> bool {
        self.status == OrderStatus::Accepted
            && self.delivery_partner.is_none()
            && self.payment_settled_or_cash()
    }
}

impl Record for Order {
    fn id(&self) -> Uuid {
        self.id
    }
}
