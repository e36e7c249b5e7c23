use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::order::PaymentMethod;

/// Who a targeted notice is for, relative to the order it concerns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Consumer,
    Farmer,
    Partner,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tone {
    Success,
    Alert,
}

/// Describes work for the caller to carry out after a ledger change. The
/// engine only returns these; the notification sink executes them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Notify {
        audience: Audience,
        tone: Tone,
        message: String,
    },
    AdminLog {
        message: String,
    },
    PaymentSettled {
        method: PaymentMethod,
    },
    PartnerAssigned {
        partner_id: Uuid,
    },
    /// Fold `score` into the partner's rolling rating.
    PartnerRated {
        partner_id: Uuid,
        score: u8,
    },
}

impl Effect {
    pub fn notify(audience: Audience, tone: Tone, message: impl Into<String>) -> Self {
        Effect::Notify {
            audience,
            tone,
            message: message.into(),
        }
    }

    pub fn admin(message: impl Into<String>) -> Self {
        Effect::AdminLog {
            message: message.into(),
        }
    }
}

/// A targeted notice after its audience has been resolved to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notice {
    pub id: Uuid,
    pub recipient: Uuid,
    pub order_id: Option<Uuid>,
    pub tone: Tone,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
