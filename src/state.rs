use std::sync::Arc;

use tokio::time::Duration;

use crate::config::Config;
use crate::engine::checkout::Pricing;
use crate::engine::ledger::OrderLedger;
use crate::engine::payment::{Authorizer, PaymentProcessor, RandomAuthorizer};
use crate::engine::transition::TransitionContext;
use crate::models::order::Order;
use crate::models::product::Product;
use crate::models::user::User;
use crate::notify::NotificationSink;
use crate::observability::metrics::Metrics;
use crate::store::{MemoryRepository, Repository};

pub struct AppState {
    pub config: Config,
    pub ledger: OrderLedger,
    pub users: Arc<dyn Repository<User>>,
    pub products: Arc<dyn Repository<Product>>,
    pub sink: NotificationSink,
    pub payments: PaymentProcessor,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let authorizer = Arc::new(RandomAuthorizer::new(config.payment_success_rate));
        Self::with_parts(
            config,
            Arc::new(MemoryRepository::<Order>::new()),
            Arc::new(MemoryRepository::<User>::new()),
            Arc::new(MemoryRepository::<Product>::new()),
            authorizer,
        )
    }

    pub fn with_parts(
        config: Config,
        orders: Arc<dyn Repository<Order>>,
        users: Arc<dyn Repository<User>>,
        products: Arc<dyn Repository<Product>>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        let payments = PaymentProcessor::new(
            Duration::from_millis(config.payment_delay_ms),
            authorizer,
        );
        let metrics = Metrics::new();
        let ledger = OrderLedger::new(orders);
        metrics.orders_open.set(
            ledger
                .list()
                .iter()
                .filter(|order| !order.status.is_terminal())
                .count() as i64,
        );

        Self {
            sink: NotificationSink::new(config.event_buffer_size),
            config,
            ledger,
            users,
            products,
            payments,
            metrics,
        }
    }

    pub fn pricing(&self) -> Pricing {
        Pricing {
            platform_fee: self.config.platform_fee,
            delivery_cost: self.config.flat_delivery_cost,
            distance_km: self.config.default_distance_km,
        }
    }

    pub fn transition_context(&self) -> TransitionContext {
        TransitionContext::new(self.config.delivery_eta_minutes)
    }
}
