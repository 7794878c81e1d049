//! Colored stdout logging shared by every module of the monitor.
//!
//! Every line carries the level tag and the UTC wall-clock time, which is the
//! same clock the exposure table is stamped with.

/// Environment variable enabling per-step [`event!`] output.
pub const EVENT_LOG_VAR: &str = "TWILIGHT_LOG_EVENTS";

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("\x1b[32m[INFO] [{}]\x1b[0m {}", chrono::Utc::now().format("%m-%d %H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!("\x1b[33m[LOG]  [{}]\x1b[0m {}", chrono::Utc::now().format("%m-%d %H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        println!("\x1b[35m[WARN] [{}]\x1b[0m {}", chrono::Utc::now().format("%m-%d %H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        println!("\x1b[31m[ERROR][{}]\x1b[0m {}", chrono::Utc::now().format("%m-%d %H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        panic!("\x1b[1;31m[FATAL][{}]\x1b[0m {}", chrono::Utc::now().format("%m-%d %H:%M:%S"), format!($($arg)*))
    };
}

/// Phase banner of the map protocol, framed by blank lines so a run reads in blocks.
#[macro_export]
macro_rules! phase {
    ($($arg:tt)*) => {
        println!("\n\x1b[1;34m[PHASE][{}]\x1b[0m {}\n", chrono::Utc::now().format("%m-%d %H:%M:%S"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if std::env::var($crate::logger::EVENT_LOG_VAR).is_ok() {
            println!("\x1b[36m[EVENT][{}]\x1b[0m {}", chrono::Utc::now().format("%m-%d %H:%M:%S"), format!($($arg)*))
        }
    };
}
