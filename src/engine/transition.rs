//! Order lifecycle rules.
//!
//! ```text
//! PENDING ──accept──▶ ACCEPTED ──claim──▶ DRIVER_ASSIGNED ──pick up──▶ PICKED_UP ──deliver──▶ DELIVERED
//!    │
//!    └──reject──▶ REJECTED
//! ```
//!
//! [`apply_transition`] is pure: it reads an order snapshot and returns the
//! next snapshot plus the effects the caller must carry out. Writing the
//! snapshot back atomically is the ledger's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::models::actor::{Actor, DeliveryActor};
use crate::models::effect::{Audience, Effect, Tone};
use crate::models::order::{DeliveryParty, Order, OrderStatus, PaymentStatus};

/// One variant per reachable target status. PENDING is only ever the
/// initial state, so it has no request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionRequest {
    Accept,
    Reject,
    Claim,
    PickUp,
    Deliver,
}

impl TransitionRequest {
    pub fn target(&self) -> OrderStatus {
        match self {
            TransitionRequest::Accept => OrderStatus::Accepted,
            TransitionRequest::Reject => OrderStatus::Rejected,
            TransitionRequest::Claim => OrderStatus::DriverAssigned,
            TransitionRequest::PickUp => OrderStatus::PickedUp,
            TransitionRequest::Deliver => OrderStatus::Delivered,
        }
    }

    /// Maps a requested status onto a request. `current` is only used to
    /// describe the failure when the status cannot be requested.
    pub fn from_target(target: OrderStatus, current: OrderStatus) -> Result<Self, LedgerError> {
        match target {
            OrderStatus::Accepted => Ok(TransitionRequest::Accept),
            OrderStatus::Rejected => Ok(TransitionRequest::Reject),
            OrderStatus::DriverAssigned => Ok(TransitionRequest::Claim),
            OrderStatus::PickedUp => Ok(TransitionRequest::PickUp),
            OrderStatus::Delivered => Ok(TransitionRequest::Deliver),
            OrderStatus::Pending => Err(LedgerError::InvalidTransition {
                from: current,
                to: target,
                reason: "orders cannot return to pending",
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransitionContext {
    pub eta_minutes: u32,
    pub now: DateTime<Utc>,
}

impl TransitionContext {
    pub fn new(eta_minutes: u32) -> Self {
        Self {
            eta_minutes,
            now: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub order: Order,
    pub effects: Vec<Effect>,
}

pub fn apply_transition(
    order: &Order,
    request: TransitionRequest,
    actor: &Actor,
    ctx: &TransitionContext,
) -> Result<Transition, LedgerError> {
    let target = request.target();
    let invalid = |reason: &'static str| LedgerError::InvalidTransition {
        from: order.status,
        to: target,
        reason,
    };

    if order.status.is_terminal() {
        return Err(invalid("order is closed"));
    }

    let mut next = order.clone();
    next.status = target;
    next.updated_at = ctx.now;

    let effects = match request {
        TransitionRequest::Accept | TransitionRequest::Reject => {
            if order.status != OrderStatus::Pending {
                return Err(invalid("order is not awaiting farmer confirmation"));
            }
            if !matches!(actor, Actor::Farmer { id } if *id == order.farmer.id) {
                return Err(invalid("only the order's farmer can confirm availability"));
            }

            if request == TransitionRequest::Accept {
                vec![
                    Effect::notify(
                        Audience::Consumer,
                        Tone::Success,
                        "Good news! Farmer confirmed product availability. Your order is being prepared for delivery",
                    ),
                    Effect::admin(
                        "Farmer verified availability for the order and awaiting delivery acceptance.",
                    ),
                ]
            } else {
                vec![
                    Effect::notify(
                        Audience::Consumer,
                        Tone::Alert,
                        "Sorry! The product is currently unavailable. Please try another farmer or product",
                    ),
                    Effect::admin("Order cancelled due to product unavailability."),
                ]
            }
        }
        TransitionRequest::Claim => {
            let Actor::Delivery(courier) = actor else {
                return Err(invalid("only delivery partners can claim jobs"));
            };
            // Checked before status: the loser of a claim race sees the
            // winner's assignment, whatever status it has reached since.
            if order.delivery_partner.is_some() {
                return Err(LedgerError::AlreadyClaimed { order_id: order.id });
            }
            if order.status != OrderStatus::Accepted {
                return Err(invalid("order has not been confirmed by the farmer"));
            }
            if !order.payment_settled_or_cash() {
                return Err(invalid("order is awaiting payment"));
            }

            let partner = delivery_party(courier)?;
            let partner_id = partner.id;
            next.delivery_partner = Some(partner);

            vec![
                Effect::PartnerAssigned { partner_id },
                Effect::notify(
                    Audience::Partner,
                    Tone::Success,
                    "Order accepted successfully. Proceed to pickup location",
                ),
                Effect::notify(
                    Audience::Consumer,
                    Tone::Success,
                    format!(
                        "Your order has been accepted by a delivery partner. Estimated delivery time: {} minutes",
                        ctx.eta_minutes
                    ),
                ),
                Effect::admin("Delivery partner assigned successfully."),
            ]
        }
        TransitionRequest::PickUp => {
            if order.status != OrderStatus::DriverAssigned {
                return Err(invalid("order is not waiting for pickup"));
            }
            ensure_assigned_partner(order, actor).map_err(invalid)?;

            vec![Effect::admin("In Transit")]
        }
        TransitionRequest::Deliver => {
            if order.status != OrderStatus::PickedUp {
                return Err(invalid("order has not been picked up"));
            }
            ensure_assigned_partner(order, actor).map_err(invalid)?;

            let mut effects = Vec::with_capacity(2);
            if order.payment_status != PaymentStatus::Paid {
                next.payment_status = PaymentStatus::Paid;
                effects.push(Effect::PaymentSettled {
                    method: order.payment_method,
                });
            }
            effects.push(Effect::admin("Order completed successfully"));
            effects
        }
    };

    Ok(Transition {
        order: next,
        effects,
    })
}

fn ensure_assigned_partner(order: &Order, actor: &Actor) -> Result<(), &'static str> {
    match (actor, order.partner_id()) {
        (Actor::Delivery(courier), Some(partner_id)) if courier.id == partner_id => Ok(()),
        _ => Err("only the assigned delivery partner can update this order"),
    }
}

fn delivery_party(courier: &DeliveryActor) -> Result<DeliveryParty, LedgerError> {
    let vehicle = courier
        .vehicle
        .ok_or(LedgerError::MissingActorContext("no vehicle registered"))?;

    Ok(DeliveryParty {
        id: courier.id,
        name: courier.name.clone(),
        phone: courier.phone.clone(),
        vehicle,
    })
}
