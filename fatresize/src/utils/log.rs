use std::sync::atomic::{AtomicI32, Ordering};

/// Process verbosity: `-1` quiet, `0` normal, each `-v` adds one.
static VERBOSITY: AtomicI32 = AtomicI32::new(0);

pub fn set_verbosity(level: i32) {
    VERBOSITY.store(level, Ordering::Relaxed);
}

pub fn verbosity() -> i32 {
    VERBOSITY.load(Ordering::Relaxed)
}

#[macro_export]
macro_rules! log_normal {
    ($($arg:tt)*) => {
        if $crate::utils::verbosity() >= 0 {
            println!("{}", format_args!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_status {
    ($($arg:tt)*) => {
        if $crate::utils::verbosity() >= 1 {
            println!("{}", format_args!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {
        if $crate::utils::verbosity() >= 3 {
            println!("{}", format_args!($($arg)*));
        }
    };
}
