//! Logging Module
//!
//! Level-filtered logging behind the `Logger` trait.

pub mod src {
    pub mod console_logger;
    pub mod logger;
    pub mod memory_logger;
}

pub use src::console_logger::ConsoleLogger;
pub use src::logger::{LogLevel, Logger, NullLogger};
pub use src::memory_logger::MemoryLogger;
