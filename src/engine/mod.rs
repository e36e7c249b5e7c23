pub mod catalog;
pub mod checkout;
pub mod ledger;
pub mod payment;
pub mod projections;
pub mod rating;
pub mod transition;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::models::actor::{Actor, DeliveryActor};
    use crate::models::order::{
        ConsumerParty, DeliveryParty, FarmerParty, LineItem, Order, OrderStatus, PaymentMethod,
        PaymentStatus,
    };
    use crate::models::product::Product;
    use crate::models::user::{Role, User, VehicleType};

    pub const CONSUMER: u128 = 1;
    pub const FARMER: u128 = 2;
    pub const COURIER: u128 = 10;

    pub fn farmer() -> Actor {
        Actor::Farmer {
            id: Uuid::from_u128(FARMER),
        }
    }

    pub fn consumer() -> Actor {
        Actor::Consumer {
            id: Uuid::from_u128(CONSUMER),
        }
    }

    pub fn courier(seed: u128) -> Actor {
        Actor::Delivery(DeliveryActor {
            id: Uuid::from_u128(seed),
            name: format!("courier-{seed}"),
            phone: Some("9988776655".to_string()),
            vehicle: Some(VehicleType::Bike),
        })
    }

    pub fn courier_party(seed: u128) -> DeliveryParty {
        DeliveryParty {
            id: Uuid::from_u128(seed),
            name: format!("courier-{seed}"),
            phone: None,
            vehicle: VehicleType::Bike,
        }
    }

    pub fn pending_order() -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::from_u128(500),
            reference: 1001,
            consumer: ConsumerParty {
                id: Uuid::from_u128(CONSUMER),
                name: "Asha".to_string(),
                phone: Some("9000000001".to_string()),
            },
            farmer: FarmerParty {
                id: Uuid::from_u128(FARMER),
                name: "Ravi".to_string(),
                phone: Some("9000000002".to_string()),
                village: Some("Sira".to_string()),
            },
            delivery_partner: None,
            items: vec![LineItem {
                product_id: Uuid::from_u128(900),
                name: "Tomato".to_string(),
                quantity: 2.0,
                unit_price: 40.0,
            }],
            total_amount: 82.0,
            delivery_cost: 165.0,
            distance_km: 50.0,
            address: "Tumkur Hub".to_string(),
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Pending,
            rating: None,
            feedback: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(status: OrderStatus) -> Order {
        let mut order = pending_order();
        order.status = status;
        order
    }

    pub fn delivered_order() -> Order {
        let mut order = with_status(OrderStatus::Delivered);
        order.delivery_partner = Some(courier_party(COURIER));
        order.payment_status = PaymentStatus::Paid;
        order
    }

    fn user(seed: u128, name: &str, role: Role) -> User {
        User {
            id: Uuid::from_u128(seed),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: Some(format!("90000000{seed:02}")),
            role,
            village: Some("Sira".to_string()),
            rating: None,
            vehicle: None,
            created_at: Utc::now(),
        }
    }

    pub fn consumer_user() -> User {
        user(CONSUMER, "Asha", Role::Consumer)
    }

    pub fn farmer_user() -> User {
        user(FARMER, "Ravi", Role::Farmer)
    }

    pub fn product(seed: u128, farmer_seed: u128, price_per_kg: f64) -> Product {
        Product {
            id: Uuid::from_u128(1_000 + seed),
            farmer_id: Uuid::from_u128(farmer_seed),
            farmer_name: "Ravi".to_string(),
            farmer_village: "Sira".to_string(),
            name: format!("crop-{seed}"),
            price_per_kg,
            quantity_available: 100.0,
            category: "Produce".to_string(),
            description: "Standard grade. AI-Verified Price.".to_string(),
            listed_at: Utc::now(),
        }
    }
}
