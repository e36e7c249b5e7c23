use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use tokio::time::{Duration, sleep};
use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::ledger::OrderLedger;
use crate::engine::transition::Transition;
use crate::error::LedgerError;
use crate::models::actor::Actor;
use crate::models::effect::Effect;
use crate::models::order::{Order, OrderStatus, PaymentMethod, PaymentStatus};

/// Decides whether a simulated gateway accepts a payment.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, method: PaymentMethod) -> bool;
}

/// Cash always clears; electronic methods clear with `success_rate`.
pub struct RandomAuthorizer {
    success_rate: f64,
}

impl RandomAuthorizer {
    pub fn new(success_rate: f64) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }
}

impl Authorizer for RandomAuthorizer {
    fn authorize(&self, method: PaymentMethod) -> bool {
        method == PaymentMethod::Cash || rand::rng().random::<f64>() < self.success_rate
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAttempt {
    pub transition: Transition,
    pub method: PaymentMethod,
    pub succeeded: bool,
}

pub struct PaymentProcessor {
    delay: Duration,
    authorizer: Arc<dyn Authorizer>,
}

impl PaymentProcessor {
    pub fn new(delay: Duration, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { delay, authorizer }
    }

    /// Submits a payment and waits for the gateway's answer. The outcome is
    /// applied to whatever the order looks like once the answer arrives,
    /// not to the snapshot checked at submission.
    pub async fn capture(
        &self,
        ledger: &OrderLedger,
        order_id: Uuid,
        actor: &Actor,
        method: PaymentMethod,
    ) -> Result<PaymentAttempt, LedgerError> {
        ensure_payable(&ledger.get(order_id)?, actor)?;

        sleep(self.delay).await;
        let succeeded = self.authorizer.authorize(method);

        let transition = ledger.commit(order_id, |current| {
            ensure_awaiting_payment(current)?;
            Ok(settle_payment(current, method, succeeded, Utc::now()))
        })
        .inspect_err(|err| {
            warn!(order_id = %order_id, method = method.as_str(), error = %err, "payment answer dropped");
        })?;

        if succeeded {
            info!(order_id = %order_id, method = method.as_str(), "payment captured");
        } else {
            warn!(order_id = %order_id, method = method.as_str(), "payment declined");
        }

        Ok(PaymentAttempt {
            transition,
            method,
            succeeded,
        })
    }
}

pub fn ensure_payable(order: &Order, actor: &Actor) -> Result<(), LedgerError> {
    if !matches!(actor, Actor::Consumer { id } if *id == order.consumer.id) {
        return Err(LedgerError::NotPermitted(
            "only the consumer who placed the order can pay for it",
        ));
    }
    ensure_awaiting_payment(order)
}

/// Checked again when the gateway answers: the order may have been paid,
/// claimed or delivered while the attempt was in flight.
fn ensure_awaiting_payment(order: &Order) -> Result<(), LedgerError> {
    if order.status != OrderStatus::Accepted || order.payment_status != PaymentStatus::Pending {
        return Err(LedgerError::NotPayable(order.id));
    }
    Ok(())
}

/// Applies a gateway answer. A paid order is never set back to pending by
/// a late decline.
pub fn settle_payment(
    order: &Order,
    method: PaymentMethod,
    succeeded: bool,
    now: DateTime<Utc>,
) -> Transition {
    let mut next = order.clone();
    let mut effects = Vec::with_capacity(2);

    if succeeded {
        next.payment_method = method;
        next.payment_status = PaymentStatus::Paid;
        effects.push(Effect::PaymentSettled { method });
    } else if order.payment_status == PaymentStatus::Pending {
        next.payment_method = method;
    }
    next.updated_at = now;

    let label = match next.payment_status {
        PaymentStatus::Paid => "PAID",
        PaymentStatus::Pending => "PENDING",
    };
    effects.push(Effect::admin(format!(
        "Payment status updated for Order #{}: {label}",
        order.reference
    )));

    Transition {
        order: next,
        effects,
    }
}
