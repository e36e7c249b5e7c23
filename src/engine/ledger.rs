use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::engine::transition::{Transition, TransitionContext, TransitionRequest, apply_transition};
use crate::error::LedgerError;
use crate::models::actor::Actor;
use crate::models::order::Order;
use crate::store::Repository;

const FIRST_REFERENCE: u64 = 1001;

/// Sole writer of order records. Every change runs through
/// [`Repository::update`], which holds the order's lock for the whole
/// read-validate-write, so a claim is a compare-and-set on the assignment.
pub struct OrderLedger {
    orders: Arc<dyn Repository<Order>>,
    next_reference: AtomicU64,
}

impl OrderLedger {
    pub fn new(orders: Arc<dyn Repository<Order>>) -> Self {
        let next = orders
            .list()
            .iter()
            .map(|order| order.reference + 1)
            .max()
            .unwrap_or(FIRST_REFERENCE)
            .max(FIRST_REFERENCE);

        Self {
            orders,
            next_reference: AtomicU64::new(next),
        }
    }

    pub fn allocate_reference(&self) -> u64 {
        self.next_reference.fetch_add(1, Ordering::SeqCst)
    }

    pub fn open(&self, order: Order) -> Order {
        self.orders.put(order.clone());
        order
    }

    pub fn get(&self, id: Uuid) -> Result<Order, LedgerError> {
        self.orders.get(&id).ok_or(LedgerError::OrderNotFound(id))
    }

    /// Most recent first.
    pub fn list(&self) -> Vec<Order> {
        let mut orders = self.orders.list();
        orders.sort_by(|a, b| b.reference.cmp(&a.reference));
        orders
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn transition(
        &self,
        id: Uuid,
        request: TransitionRequest,
        actor: &Actor,
        ctx: &TransitionContext,
    ) -> Result<Transition, LedgerError> {
        self.commit(id, |current| apply_transition(current, request, actor, ctx))
    }

    /// Runs `compute` against the stored order and writes its result back
    /// in one step. On error the stored order is unchanged.
    pub fn commit<F>(&self, id: Uuid, mut compute: F) -> Result<Transition, LedgerError>
    where
        F: FnMut(&Order) -> Result<Transition, LedgerError>,
    {
        let mut effects = Vec::new();
        let order = self
            .orders
            .update(&id, &mut |current| {
                let transition = compute(current)?;
                effects = transition.effects;
                Ok(transition.order)
            })
            .ok_or(LedgerError::OrderNotFound(id))??;

        Ok(Transition { order, effects })
    }
}
