use prometheus::{
    Encoder, GaugeVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub order_transitions_total: IntCounterVec,
    pub payment_attempts_total: IntCounterVec,
    pub claim_conflicts_total: IntCounter,
    pub orders_open: IntGauge,
    pub partner_rating: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let order_transitions_total = IntCounterVec::new(
            Opts::new(
                "order_transitions_total",
                "Order status changes by target status and outcome",
            ),
            &["status", "outcome"],
        )
        .expect("valid order_transitions_total metric");

        let payment_attempts_total = IntCounterVec::new(
            Opts::new("payment_attempts_total", "Payment attempts by method and outcome"),
            &["method", "outcome"],
        )
        .expect("valid payment_attempts_total metric");

        let claim_conflicts_total = IntCounter::new(
            "claim_conflicts_total",
            "Delivery claims lost to another partner",
        )
        .expect("valid claim_conflicts_total metric");

        let orders_open = IntGauge::new("orders_open", "Orders not yet delivered or rejected")
            .expect("valid orders_open metric");

        let partner_rating = GaugeVec::new(
            Opts::new("partner_rating", "Rolling delivery partner rating [1..5]"),
            &["partner_id"],
        )
        .expect("valid partner_rating metric");

        registry
            .register(Box::new(order_transitions_total.clone()))
            .expect("register order_transitions_total");
        registry
            .register(Box::new(payment_attempts_total.clone()))
            .expect("register payment_attempts_total");
        registry
            .register(Box::new(claim_conflicts_total.clone()))
            .expect("register claim_conflicts_total");
        registry
            .register(Box::new(orders_open.clone()))
            .expect("register orders_open");
        registry
            .register(Box::new(partner_rating.clone()))
            .expect("register partner_rating");

        Self {
            registry,
            order_transitions_total,
            payment_attempts_total,
            claim_conflicts_total,
            orders_open,
            partner_rating,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
