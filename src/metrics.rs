use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("abf_requests_total", "Total number of admission requests").unwrap();
    pub static ref DECISIONS: CounterVec = register_counter_vec!(
        "abf_decisions_total",
        "Admission decisions by outcome",
        &["outcome"]
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "abf_request_latency_seconds",
        "Admission decision latency in seconds"
    )
    .unwrap();
    pub static ref BUCKETS: Gauge =
        register_gauge!("abf_buckets", "Current number of live rate buckets").unwrap();
}
