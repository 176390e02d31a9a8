use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec};

lazy_static! {
    pub static ref CLOCK_READS: CounterVec = register_counter_vec!(
        "dayclock_reads_total",
        "Clock lookups by outcome",
        &["outcome"]
    ).unwrap();

    pub static ref CLOCK_WRITES: CounterVec = register_counter_vec!(
        "dayclock_writes_total",
        "Clock messages stored by mode",
        &["mode"]
    ).unwrap();

    pub static ref CLOCK_REJECTIONS: CounterVec = register_counter_vec!(
        "dayclock_rejected_writes_total",
        "Clock writes rejected before reaching the store",
        &["reason"]
    ).unwrap();
}
