//! Read-only views over the ledger. Each call recomputes from the orders it
//! is given; nothing here writes.

use serde::Serialize;
use uuid::Uuid;

use crate::engine::rating::DEFAULT_PARTNER_RATING;
use crate::models::order::{Order, OrderStatus};
use crate::models::product::Product;
use crate::models::user::Role;

/// An order together with the banner its viewer should see.
#[derive(Debug, Clone, Serialize)]
pub struct OrderCard {
    pub order: Order,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmerSummary {
    pub orders: usize,
    pub delivered: usize,
    pub earnings: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliverySummary {
    pub completed: usize,
    pub earnings: f64,
    pub rating: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeliveryBoard {
    pub available: Vec<Order>,
    pub active: Vec<Order>,
    pub history: Vec<Order>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AdminOverview {
    pub total_orders: usize,
    pub delivered: usize,
    pub active_pipeline: usize,
    pub platform_revenue: f64,
    pub partner_payout: f64,
    pub users: usize,
}

pub fn farmer_orders(orders: &[Order], farmer_id: Uuid) -> Vec<Order> {
    orders
        .iter()
        .filter(|order| order.farmer.id == farmer_id)
        .cloned()
        .collect()
}

/// A farmer's own listings, newest first.
pub fn farmer_products(products: Vec<Product>, farmer_id: Uuid) -> Vec<Product> {
    let mut own: Vec<Product> = products
        .into_iter()
        .filter(|product| product.farmer_id == farmer_id)
        .collect();
    own.sort_by(|a, b| b.listed_at.cmp(&a.listed_at));
    own
}

pub fn consumer_orders(orders: &[Order], consumer_id: Uuid) -> Vec<Order> {
    orders
        .iter()
        .filter(|order| order.consumer.id == consumer_id)
        .cloned()
        .collect()
}

/// Jobs open to any partner, plus the partner's own running and finished
/// jobs. Orders still waiting on an electronic payment never show up as
/// available.
pub fn delivery_board(orders: &[Order], partner_id: Uuid) -> DeliveryBoard {
    let mut board = DeliveryBoard::default();

    for order in orders {
        if order.is_claimable() {
            board.available.push(order.clone());
        } else if order.partner_id() == Some(partner_id) {
            if order.status == OrderStatus::Delivered {
                board.history.push(order.clone());
            } else {
                board.active.push(order.clone());
            }
        }
    }

    board
}

pub fn farmer_summary(own_orders: &[Order], platform_fee: f64) -> FarmerSummary {
    let delivered: Vec<&Order> = own_orders
        .iter()
        .filter(|order| order.status == OrderStatus::Delivered)
        .collect();

    FarmerSummary {
        orders: own_orders.len(),
        delivered: delivered.len(),
        earnings: delivered
            .iter()
            .map(|order| order.total_amount - platform_fee)
            .sum(),
    }
}

pub fn delivery_summary(board: &DeliveryBoard, rating: Option<f64>) -> DeliverySummary {
    DeliverySummary {
        completed: board.history.len(),
        earnings: board.history.iter().map(|order| order.delivery_cost).sum(),
        rating: rating.unwrap_or(DEFAULT_PARTNER_RATING),
    }
}

pub fn admin_overview(orders: &[Order], users: usize, platform_fee: f64) -> AdminOverview {
    let delivered: Vec<&Order> = orders
        .iter()
        .filter(|order| order.status == OrderStatus::Delivered)
        .collect();

    AdminOverview {
        total_orders: orders.len(),
        delivered: delivered.len(),
        active_pipeline: orders
            .iter()
            .filter(|order| order.status != OrderStatus::Delivered)
            .count(),
        platform_revenue: delivered.len() as f64 * platform_fee,
        partner_payout: delivered.iter().map(|order| order.delivery_cost).sum(),
        users,
    }
}

pub fn cards(orders: Vec<Order>, viewer: Role, eta_minutes: u32) -> Vec<OrderCard> {
    orders
        .into_iter()
        .map(|order| {
            let message = status_message(&order, viewer, eta_minutes);
            OrderCard { order, message }
        })
        .collect()
}

pub fn farmer_new_order_message(order: &Order) -> String {
    let summary = order
        .items
        .iter()
        .map(|item| format!("{} {} kg", item.name, item.quantity))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "New Order Received – Order ID #{}, Product: {summary}, Consumer: {}. Please verify availability and confirm within 30 minutes",
        order.reference, order.consumer.name
    )
}

/// Banner text for `viewer` given the order's current status.
pub fn status_message(order: &Order, viewer: Role, eta_minutes: u32) -> String {
    use OrderStatus::*;

    let text = match (viewer, order.status) {
        (Role::Consumer, Pending) => {
            "Your order has been placed successfully. Waiting for farmer confirmation"
        }
        (Role::Consumer, Accepted) => {
            "Good news! Farmer confirmed product availability. Your order is being prepared for delivery"
        }
        (Role::Consumer, DriverAssigned) => {
            return format!(
                "Your order has been accepted by a delivery partner. Estimated delivery time: {eta_minutes} minutes"
            );
        }
        (Role::Consumer, PickedUp) => "Your order has been picked up and is on the way",
        (Role::Consumer, Delivered) => "Order delivered successfully. Please rate your experience",
        (Role::Consumer, Rejected) => {
            "Sorry! The product is currently unavailable. Please try another farmer or product"
        }

        (Role::Farmer, Pending) => return farmer_new_order_message(order),
        (Role::Farmer, Accepted) => "Harvest confirmed. Awaiting delivery partner acceptance.",
        (Role::Farmer, DriverAssigned) => {
            "Delivery partner assigned for your order. Please keep the product ready"
        }
        (Role::Farmer, PickedUp) => "Delivery partner collected the product",
        (Role::Farmer, Delivered) => "Order delivered to customer",
        (Role::Farmer, Rejected) => "Order cancelled due to unavailability.",

        (Role::Delivery, Accepted) => {
            return format!(
                "New delivery request available – Order ID #{}, Pickup from farmer location and deliver to consumer location. Please accept the order",
                order.reference
            );
        }
        (Role::Delivery, DriverAssigned) => "Order accepted successfully. Proceed to pickup location",
        (Role::Delivery, PickedUp) => "Proceeding to delivery destination.",
        (Role::Delivery, Delivered) => "Delivery complete.",
        (Role::Delivery, other) => other.as_str(),

        (Role::Admin, Pending) => "New order placed by consumer. Waiting for farmer verification.",
        (Role::Admin, Accepted) => {
            "Farmer verified availability for the order and awaiting delivery acceptance."
        }
        (Role::Admin, DriverAssigned) => "Delivery partner assigned successfully.",
        (Role::Admin, PickedUp) => "In Transit",
        (Role::Admin, Delivered) => "Order completed successfully",
        (Role::Admin, Rejected) => "Order cancelled due to product unavailability.",
    };

    text.to_string()
}
