use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::order::{OrderStatus, PaymentMethod};

/// Failures of order-level operations. Every variant is local and
/// recoverable: the order it concerns is left exactly as it was.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    #[error("invalid transition {from:?} -> {to:?}: {reason}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
        reason: &'static str,
    },

    #[error("order {order_id} already claimed by another delivery partner")]
    AlreadyClaimed { order_id: Uuid },

    #[error("payment via {method:?} failed for order {order_id}")]
    PaymentFailed { order_id: Uuid, method: PaymentMethod },

    #[error("missing actor context: {0}")]
    MissingActorContext(&'static str),

    #[error("order {0} not found")]
    OrderNotFound(Uuid),

    #[error("order {0} is not awaiting payment")]
    NotPayable(Uuid),

    #[error("order {0} is not delivered yet")]
    NotDelivered(Uuid),

    #[error("not permitted: {0}")]
    NotPermitted(&'static str),

    #[error("order {0} already rated")]
    AlreadyRated(Uuid),

    #[error("rating {0} out of range 1..=5")]
    InvalidRating(u8),

    #[error("cart is empty or has a non-positive quantity")]
    EmptyCart,

    #[error("cart mixes products from several farmers")]
    MixedFarmers,

    #[error("checkout does not accept {0:?}")]
    UnsupportedCheckoutMethod(PaymentMethod),

    #[error("listing rejected: {0}")]
    ListingRejected(String),
}

impl LedgerError {
    /// Short text fit for showing to the person who made the request.
    pub fn user_message(&self) -> String {
        match self {
            LedgerError::InvalidTransition { from, to, reason } => format!(
                "This order cannot move from {} to {} ({reason}).",
                from.as_str(),
                to.as_str()
            ),
            LedgerError::AlreadyClaimed { .. } => {
                "This delivery job is no longer available.".to_string()
            }
            LedgerError::PaymentFailed { method, .. } => format!(
                "Payment via {} did not go through. Please try again or choose another method.",
                method.as_str()
            ),
            LedgerError::MissingActorContext(reason) => {
                format!("Your profile is incomplete: {reason}.")
            }
            LedgerError::OrderNotFound(_) => "We could not find that order.".to_string(),
            LedgerError::NotPayable(_) => {
                "This order is not waiting for a payment.".to_string()
            }
            LedgerError::NotDelivered(_) => {
                "You can rate an order once it has been delivered.".to_string()
            }
            LedgerError::NotPermitted(reason) => format!("You cannot do that: {reason}."),
            LedgerError::AlreadyRated(_) => "You have already rated this order.".to_string(),
            LedgerError::InvalidRating(_) => "Please pick a rating from 1 to 5.".to_string(),
            LedgerError::EmptyCart => "Add at least one item to your cart.".to_string(),
            LedgerError::MixedFarmers => {
                "Please order from one farmer at a time.".to_string()
            }
            LedgerError::UnsupportedCheckoutMethod(_) => {
                "Choose UPI or Cash on Delivery at checkout.".to_string()
            }
            LedgerError::ListingRejected(reason) => {
                format!("This crop cannot be listed: {reason}.")
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidTransition { .. } => "invalid_transition",
            LedgerError::AlreadyClaimed { .. } => "already_claimed",
            LedgerError::PaymentFailed { .. } => "payment_failed",
            LedgerError::MissingActorContext(_) => "missing_actor_context",
            LedgerError::OrderNotFound(_) => "order_not_found",
            LedgerError::NotPayable(_) => "not_payable",
            LedgerError::NotDelivered(_) => "not_delivered",
            LedgerError::NotPermitted(_) => "not_permitted",
            LedgerError::AlreadyRated(_) => "already_rated",
            LedgerError::InvalidRating(_) => "invalid_rating",
            LedgerError::EmptyCart => "empty_cart",
            LedgerError::MixedFarmers => "mixed_farmers",
            LedgerError::UnsupportedCheckoutMethod(_) => "unsupported_checkout_method",
            LedgerError::ListingRejected(_) => "listing_rejected",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            LedgerError::InvalidTransition { .. }
            | LedgerError::AlreadyClaimed { .. }
            | LedgerError::NotPayable(_)
            | LedgerError::NotDelivered(_)
            | LedgerError::AlreadyRated(_) => StatusCode::CONFLICT,
            LedgerError::NotPermitted(_) => StatusCode::FORBIDDEN,
            LedgerError::PaymentFailed { .. } => StatusCode::PAYMENT_REQUIRED,
            LedgerError::MissingActorContext(_)
            | LedgerError::InvalidRating(_)
            | LedgerError::EmptyCart
            | LedgerError::MixedFarmers
            | LedgerError::UnsupportedCheckoutMethod(_) => StatusCode::BAD_REQUEST,
            LedgerError::ListingRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Ledger(err) => (err.status(), err.code(), err.user_message()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg.clone())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}
