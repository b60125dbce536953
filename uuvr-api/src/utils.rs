use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering::SeqCst;

static ID_COUNTER: AtomicU32 = AtomicU32::new(0);

// Generates a unique identifier for sessions and camera controllers
pub fn new_id() -> u32 {
    ID_COUNTER.fetch_add(1, SeqCst)
}

// Returns the current time in milliseconds
#[cfg(feature = "utils")]
pub fn timestamp() -> f64 {
    let now = time::OffsetDateTime::now_utc();
    now.unix_timestamp_nanos() as f64 * 1e-6
}

#[cfg(not(feature = "utils"))]
pub fn timestamp() -> f64 {
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
    }
}
