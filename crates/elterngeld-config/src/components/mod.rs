//! Configuration components for the chat core
//!
//! One small section per concern, each usable on its own with sensible defaults.

pub mod anchor;
pub mod follow;
pub mod messages;
pub mod streaming;
pub mod transport;

pub use anchor::*;
pub use follow::*;
pub use messages::*;
pub use streaming::*;
pub use transport::*;
