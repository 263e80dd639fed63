use axum_prometheus::metrics::Counter;

/// Gets a prometheus counter
pub fn metric_counter(name: &'static str) -> Counter {
    axum_prometheus::metrics::counter!(name)
}
