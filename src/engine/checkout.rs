use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::projections::farmer_new_order_message;
use crate::engine::transition::Transition;
use crate::error::LedgerError;
use crate::models::effect::{Audience, Effect, Tone};
use crate::models::order::{
    ConsumerParty, FarmerParty, LineItem, Order, OrderStatus, PaymentMethod, PaymentStatus,
};
use crate::models::product::Product;
use crate::models::user::User;

const FALLBACK_ADDRESS: &str = "Tumkur Hub";

#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: f64,
}

#[derive(Debug, Clone)]
pub struct Pricing {
    pub platform_fee: f64,
    pub delivery_cost: f64,
    pub distance_km: f64,
}

/// Everything checkout needs, already looked up by the caller.
pub struct CheckoutInput<'a> {
    pub consumer: &'a User,
    /// The farmer's directory record, when there is one, for the phone number.
    pub farmer: Option<&'a User>,
    pub lines: Vec<(Product, f64)>,
    pub method: PaymentMethod,
    pub address: Option<String>,
    pub reference: u64,
    pub now: DateTime<Utc>,
}

pub fn build_order(input: CheckoutInput<'_>, pricing: &Pricing) -> Result<Transition, LedgerError> {
    if !matches!(input.method, PaymentMethod::Upi | PaymentMethod::Cash) {
        return Err(LedgerError::UnsupportedCheckoutMethod(input.method));
    }
    let Some((first, _)) = input.lines.first() else {
        return Err(LedgerError::EmptyCart);
    };
    if input
        .lines
        .iter()
        .any(|(_, quantity)| !quantity.is_finite() || *quantity <= 0.0)
    {
        return Err(LedgerError::EmptyCart);
    }
    if input
        .lines
        .iter()
        .any(|(product, _)| product.farmer_id != first.farmer_id)
    {
        return Err(LedgerError::MixedFarmers);
    }

    let farmer = FarmerParty {
        id: first.farmer_id,
        name: first.farmer_name.clone(),
        phone: input.farmer.and_then(|user| user.phone.clone()),
        village: Some(first.farmer_village.clone()),
    };

    let items: Vec<LineItem> = input
        .lines
        .iter()
        .map(|(product, quantity)| LineItem {
            product_id: product.id,
            name: product.name.clone(),
            quantity: *quantity,
            unit_price: product.price_per_kg,
        })
        .collect();
    let product_total: f64 = items
        .iter()
        .map(|item| item.quantity * item.unit_price)
        .sum();

    let address = input
        .address
        .filter(|address| !address.trim().is_empty())
        .or_else(|| input.consumer.village.clone())
        .unwrap_or_else(|| FALLBACK_ADDRESS.to_string());

    let order = Order {
        id: Uuid::new_v4(),
        reference: input.reference,
        consumer: ConsumerParty {
            id: input.consumer.id,
            name: input.consumer.name.clone(),
            phone: input.consumer.phone.clone(),
        },
        farmer,
        delivery_partner: None,
        items,
        total_amount: product_total + pricing.platform_fee,
        delivery_cost: pricing.delivery_cost,
        distance_km: pricing.distance_km,
        address,
        status: OrderStatus::Pending,
        payment_method: input.method,
        payment_status: PaymentStatus::Pending,
        rating: None,
        feedback: None,
        created_at: input.now,
        updated_at: input.now,
    };

    let effects = vec![
        Effect::notify(
            Audience::Consumer,
            Tone::Success,
            "Your order has been placed successfully. Waiting for farmer confirmation",
        ),
        Effect::notify(
            Audience::Farmer,
            Tone::Success,
            farmer_new_order_message(&order),
        ),
        Effect::admin("New order placed by consumer. Waiting for farmer verification."),
    ];

    Ok(Transition { order, effects })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{FARMER, consumer_user, farmer_user, product};

    fn pricing() -> Pricing {
        Pricing {
            platform_fee: 2.0,
            delivery_cost: 165.0,
            distance_km: 50.0,
        }
    }

    fn input<'a>(consumer: &'a User, lines: Vec<(Product, f64)>, method: PaymentMethod) -> CheckoutInput<'a> {
        CheckoutInput {
            consumer,
            farmer: None,
            lines,
            method,
            address: None,
            reference: 1001,
            now: Utc::now(),
        }
    }

    #[test]
    fn order_starts_pending_with_fee_added() {
        let consumer = consumer_user();
        let farmer = farmer_user();
        let lines = vec![(product(1, FARMER, 40.0), 2.0), (product(2, FARMER, 10.0), 1.5)];

        let mut checkout = input(&consumer, lines, PaymentMethod::Upi);
        checkout.farmer = Some(&farmer);
        let placed = build_order(checkout, &pricing()).unwrap();
        let order = placed.order;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.total_amount, 97.0);
        assert_eq!(order.delivery_cost, 165.0);
        assert_eq!(order.farmer.phone, farmer.phone);
        assert_eq!(order.address, "Sira");
        assert_eq!(placed.effects.len(), 3);
    }

    #[test]
    fn empty_and_zero_quantity_carts_fail() {
        let consumer = consumer_user();
        assert_eq!(
            build_order(input(&consumer, vec![], PaymentMethod::Cash), &pricing()).unwrap_err(),
            LedgerError::EmptyCart
        );
        assert_eq!(
            build_order(
                input(&consumer, vec![(product(1, FARMER, 40.0), 0.0)], PaymentMethod::Cash),
                &pricing()
            )
            .unwrap_err(),
            LedgerError::EmptyCart
        );
    }

    #[test]
    fn carts_from_two_farmers_are_refused() {
        let consumer = consumer_user();
        let lines = vec![(product(1, FARMER, 40.0), 1.0), (product(2, FARMER + 50, 10.0), 1.0)];
        assert_eq!(
            build_order(input(&consumer, lines, PaymentMethod::Cash), &pricing()).unwrap_err(),
            LedgerError::MixedFarmers
        );
    }

    #[test]
    fn checkout_only_takes_upi_or_cash() {
        let consumer = consumer_user();
        let lines = vec![(product(1, FARMER, 40.0), 1.0)];
        assert_eq!(
            build_order(input(&consumer, lines, PaymentMethod::Card), &pricing()).unwrap_err(),
            LedgerError::UnsupportedCheckoutMethod(PaymentMethod::Card)
        );
    }

    #[test]
    fn address_falls_back_to_hub() {
        let mut consumer = consumer_user();
        consumer.village = None;
        let lines = vec![(product(1, FARMER, 40.0), 1.0)];
        let order = build_order(input(&consumer, lines, PaymentMethod::Cash), &pricing())
            .unwrap()
            .order;
        assert_eq!(order.address, FALLBACK_ADDRESS);
    }
}
