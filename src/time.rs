use chrono::{Duration, NaiveDateTime, Utc};

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

// Time left before `window` has elapsed since `last_time`, zero once it has
pub fn check_window(last_time: &NaiveDateTime, window: Duration) -> Duration {
    let elapsed = now() - *last_time;
    if elapsed >= window {
        Duration::zero()
    } else {
        window - elapsed
    }
}

pub fn has_elapsed(last_time: &NaiveDateTime, window: Duration) -> bool {
    check_window(last_time, window).is_zero()
}
