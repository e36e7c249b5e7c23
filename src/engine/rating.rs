use chrono::{DateTime, Utc};

use crate::engine::transition::Transition;
use crate::error::LedgerError;
use crate::models::actor::Actor;
use crate::models::effect::Effect;
use crate::models::order::{Order, OrderStatus};

pub(crate) const DEFAULT_PARTNER_RATING: f64 = 5.0;

/// Records the consumer's score on a delivered order. Ratings are written
/// once; the partner update is returned as an effect.
pub fn rate_order(
    order: &Order,
    actor: &Actor,
    score: u8,
    feedback: Option<String>,
    now: DateTime<Utc>,
) -> Result<Transition, LedgerError> {
    if !(1..=5).contains(&score) {
        return Err(LedgerError::InvalidRating(score));
    }
    if !matches!(actor, Actor::Consumer { id } if *id == order.consumer.id) {
        return Err(LedgerError::NotPermitted(
            "only the consumer who placed the order can rate it",
        ));
    }
    if order.status != OrderStatus::Delivered {
        return Err(LedgerError::NotDelivered(order.id));
    }
    if order.rating.is_some() {
        return Err(LedgerError::AlreadyRated(order.id));
    }

    let mut next = order.clone();
    next.rating = Some(score);
    next.feedback = feedback;
    next.updated_at = now;

    let effects = order
        .partner_id()
        .map(|partner_id| Effect::PartnerRated { partner_id, score })
        .into_iter()
        .collect();

    Ok(Transition {
        order: next,
        effects,
    })
}

/// Halves the distance between the old rating and the new score, rounded
/// to one decimal. Not a running mean: recent scores dominate.
pub fn next_partner_rating(current: Option<f64>, score: u8) -> f64 {
    let current = current.unwrap_or(DEFAULT_PARTNER_RATING);
    ((current + f64::from(score)) / 2.0 * 10.0).round() / 10.0
}
