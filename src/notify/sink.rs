use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::models::effect::{Audience, Effect, Notice};
use crate::models::order::Order;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminEntry {
    pub message: String,
    pub order_id: Option<Uuid>,
    pub logged_at: DateTime<Utc>,
}

/// What live subscribers receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SinkEvent {
    Notice(Notice),
    Admin(AdminEntry),
}

/// Append-only destination for everything the engine wants people to see.
pub struct NotificationSink {
    admin_log: RwLock<Vec<AdminEntry>>,
    inboxes: DashMap<Uuid, Vec<Notice>>,
    events_tx: broadcast::Sender<SinkEvent>,
}

impl NotificationSink {
    pub fn new(event_buffer_size: usize) -> Self {
        let (events_tx, _unused_rx) = broadcast::channel(event_buffer_size.max(1));
        Self {
            admin_log: RwLock::new(Vec::new()),
            inboxes: DashMap::new(),
            events_tx,
        }
    }

    /// Carries out the notification effects of a change to `order`.
    /// State effects were already applied by the ledger and are skipped.
    pub fn deliver(&self, effects: &[Effect], order: &Order) -> Vec<Notice> {
        let mut delivered = Vec::new();

        for effect in effects {
            match effect {
                Effect::Notify {
                    audience,
                    tone,
                    message,
                } => {
                    let recipient = match audience {
                        Audience::Consumer => Some(order.consumer.id),
                        Audience::Farmer => Some(order.farmer.id),
                        Audience::Partner => order.partner_id(),
                    };
                    let Some(recipient) = recipient else {
                        debug!(order_id = %order.id, ?audience, "notice has no recipient yet");
                        continue;
                    };

                    let notice = Notice {
                        id: Uuid::new_v4(),
                        recipient,
                        order_id: Some(order.id),
                        tone: *tone,
                        message: message.clone(),
                        created_at: Utc::now(),
                    };
                    self.push_notice(notice.clone());
                    delivered.push(notice);
                }
                Effect::AdminLog { message } => self.append_admin(message.clone(), Some(order.id)),
                other => debug!(order_id = %order.id, effect = ?other, "state effect recorded"),
            }
        }

        delivered
    }

    pub fn log_admin(&self, message: impl Into<String>) {
        self.append_admin(message.into(), None);
    }

    /// Newest first.
    pub fn admin_log(&self) -> Vec<AdminEntry> {
        self.admin_log.read().iter().rev().cloned().collect()
    }

    /// Newest first.
    pub fn inbox(&self, user_id: &Uuid) -> Vec<Notice> {
        self.inboxes
            .get(user_id)
            .map(|notices| notices.iter().rev().cloned().collect())
            .unwrap_or_default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SinkEvent> {
        self.events_tx.subscribe()
    }

    fn append_admin(&self, message: String, order_id: Option<Uuid>) {
        let entry = AdminEntry {
            message,
            order_id,
            logged_at: Utc::now(),
        };
        self.admin_log.write().push(entry.clone());
        let _ = self.events_tx.send(SinkEvent::Admin(entry));
    }

    fn push_notice(&self, notice: Notice) {
        self.inboxes
            .entry(notice.recipient)
            .or_default()
            .push(notice.clone());
        let _ = self.events_tx.send(SinkEvent::Notice(notice));
    }
}
