pub mod progress;
mod prompt;
mod size;
mod time;

// Export utility functions
pub use self::prompt::confirm;
pub use self::size::format_bytes;
pub use self::time::format_timestamp;
