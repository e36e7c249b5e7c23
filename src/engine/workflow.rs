//! Runs engine decisions against live state: commits through the ledger,
//! executes the returned effects, and records logs and metrics.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::catalog::{ListingDraft, build_listing, is_inedible};
use crate::engine::checkout::{CartLine, CheckoutInput, build_order};
use crate::engine::rating::{next_partner_rating, rate_order};
use crate::engine::transition::{Transition, TransitionRequest};
use crate::error::{AppError, LedgerError};
use crate::models::actor::Actor;
use crate::models::effect::Effect;
use crate::models::order::{Order, OrderStatus, PaymentMethod};
use crate::models::product::Product;
use crate::models::user::{Role, User, Vehicle};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub village: Option<String>,
    pub vehicle: Option<Vehicle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    pub address: Option<String>,
}

pub fn register_user(state: &AppState, payload: NewUser) -> Result<User, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    if !payload.email.contains('@') {
        return Err(AppError::BadRequest("email is not valid".to_string()));
    }

    let user = User {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        email: payload.email,
        phone: payload.phone,
        role: payload.role,
        village: payload.village,
        rating: None,
        vehicle: payload.vehicle,
        created_at: Utc::now(),
    };

    state.users.put(user.clone());
    info!(user_id = %user.id, role = ?user.role, "user registered");
    Ok(user)
}

pub fn resolve_actor(state: &AppState, actor_id: Uuid) -> Result<User, AppError> {
    state
        .users
        .get(&actor_id)
        .ok_or_else(|| AppError::Unauthorized(format!("unknown actor {actor_id}")))
}

pub fn require_role(user: &User, role: Role) -> Result<(), AppError> {
    if user.role == role {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "{:?} accounts cannot do this, {:?} role required",
            user.role, role
        )))
    }
}

/// Orders are visible to the people on them and to admins.
pub fn view_order(state: &AppState, order_id: Uuid, viewer: &User) -> Result<Order, AppError> {
    let order = state.ledger.get(order_id)?;
    let involved = viewer.role == Role::Admin
        || order.consumer.id == viewer.id
        || order.farmer.id == viewer.id
        || order.partner_id() == Some(viewer.id);

    if !involved {
        warn!(order_id = %order_id, viewer_id = %viewer.id, "order read refused");
        return Err(AppError::Forbidden(format!(
            "order {order_id} belongs to other accounts"
        )));
    }
    Ok(order)
}

pub fn publish_listing(
    state: &AppState,
    farmer: &User,
    draft: ListingDraft,
) -> Result<Product, AppError> {
    require_role(farmer, Role::Farmer)?;

    let inedible = draft.grade.as_deref().is_some_and(is_inedible);
    let product = match build_listing(farmer, draft, Utc::now()) {
        Ok(product) => product,
        Err(err) => {
            if inedible {
                state
                    .sink
                    .log_admin("Farmer uploaded inedible crop – listing disabled");
            }
            warn!(farmer_id = %farmer.id, error = %err, "listing refused");
            return Err(err.into());
        }
    };

    state.products.put(product.clone());
    info!(product_id = %product.id, farmer_id = %farmer.id, price = product.price_per_kg, "product listed");
    Ok(product)
}

pub fn place_order(
    state: &AppState,
    consumer: &User,
    request: CheckoutRequest,
) -> Result<Order, AppError> {
    require_role(consumer, Role::Consumer)?;

    let lines = request
        .items
        .iter()
        .map(|line| {
            state
                .products
                .get(&line.product_id)
                .map(|product| (product, line.quantity))
                .ok_or_else(|| AppError::NotFound(format!("product {} not found", line.product_id)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let farmer = lines
        .first()
        .and_then(|(product, _)| state.users.get(&product.farmer_id));

    let placed = build_order(
        CheckoutInput {
            consumer,
            farmer: farmer.as_ref(),
            lines,
            method: request.payment_method,
            address: request.address,
            reference: state.ledger.allocate_reference(),
            now: Utc::now(),
        },
        &state.pricing(),
    )?;

    let order = state.ledger.open(placed.order.clone());
    execute_effects(state, &placed);

    state.metrics.orders_open.inc();
    record_transition(state, OrderStatus::Pending, "success");
    info!(
        order_id = %order.id,
        reference = order.reference,
        consumer_id = %consumer.id,
        farmer_id = %order.farmer.id,
        total = order.total_amount,
        "order placed"
    );

    Ok(order)
}

pub fn request_transition(
    state: &AppState,
    order_id: Uuid,
    target: OrderStatus,
    actor: &Actor,
) -> Result<Order, AppError> {
    let current = state.ledger.get(order_id)?;
    let result = TransitionRequest::from_target(target, current.status).and_then(|request| {
        state
            .ledger
            .transition(order_id, request, actor, &state.transition_context())
    });

    let transition = match result {
        Ok(transition) => transition,
        Err(err) => {
            if matches!(err, LedgerError::AlreadyClaimed { .. }) {
                state.metrics.claim_conflicts_total.inc();
            }
            record_transition(state, target, err.code());
            warn!(
                order_id = %order_id,
                actor_id = %actor.id(),
                role = ?actor.role(),
                target = target.as_str(),
                error = %err,
                "transition rejected"
            );
            return Err(err.into());
        }
    };

    execute_effects(state, &transition);
    record_transition(state, target, "success");
    if transition.order.status.is_terminal() {
        state.metrics.orders_open.dec();
    }

    info!(
        order_id = %order_id,
        actor_id = %actor.id(),
        status = target.as_str(),
        "order status updated"
    );

    Ok(transition.order)
}

/// Submits a payment and waits for its outcome. A declined payment still
/// records its audit entry before surfacing as `PaymentFailed`.
pub async fn capture_payment(
    state: &AppState,
    order_id: Uuid,
    actor: &Actor,
    method: PaymentMethod,
) -> Result<Order, AppError> {
    let attempt = state
        .payments
        .capture(&state.ledger, order_id, actor, method)
        .await?;

    execute_effects(state, &attempt.transition);

    let outcome = if attempt.succeeded { "success" } else { "declined" };
    state
        .metrics
        .payment_attempts_total
        .with_label_values(&[method.as_str(), outcome])
        .inc();

    if !attempt.succeeded {
        return Err(LedgerError::PaymentFailed { order_id, method }.into());
    }

    Ok(attempt.transition.order)
}

pub fn rate_delivered_order(
    state: &AppState,
    order_id: Uuid,
    actor: &Actor,
    score: u8,
    feedback: Option<String>,
) -> Result<Order, AppError> {
    let transition = state.ledger.commit(order_id, |current| {
        rate_order(current, actor, score, feedback.clone(), Utc::now())
    })?;

    execute_effects(state, &transition);
    info!(order_id = %order_id, score, "order rated");

    Ok(transition.order)
}

/// Hands notices to the sink and applies directory updates.
fn execute_effects(state: &AppState, transition: &Transition) {
    state.sink.deliver(&transition.effects, &transition.order);

    for effect in &transition.effects {
        if let Effect::PartnerRated { partner_id, score } = effect {
            update_partner_rating(state, *partner_id, *score);
        }
    }
}

fn update_partner_rating(state: &AppState, partner_id: Uuid, score: u8) {
    let updated = state.users.update(&partner_id, &mut |partner| {
        let mut next = partner.clone();
        next.rating = Some(next_partner_rating(partner.rating, score));
        Ok(next)
    });

    match updated {
        Some(Ok(partner)) => {
            let rating = partner.rating.unwrap_or_default();
            state
                .metrics
                .partner_rating
                .with_label_values(&[&partner_id.to_string()])
                .set(rating);
            info!(partner_id = %partner_id, rating, "partner rating updated");
        }
        Some(Err(err)) => warn!(partner_id = %partner_id, error = %err, "partner rating not updated"),
        None => warn!(partner_id = %partner_id, "rated partner missing from directory"),
    }
}

fn record_transition(state: &AppState, target: OrderStatus, outcome: &str) {
    state
        .metrics
        .order_transitions_total
        .with_label_values(&[target.as_str(), outcome])
        .inc();
}
