use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("storefront_statds")
        .with_description("Storefront checkout statistics")
        .with_unit("event")
        .build()
});

fn incr_statds(metric: String, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

pub fn incr_checkout_statds(step: &str) {
    incr_statds("checkout".to_string(), step.into())
}

pub fn incr_webhook_statds(event_type: &str) {
    incr_statds("stripe_webhook".to_string(), event_type.into())
}
