//! Core types of the Elterngeld chat assistant
//!
//! - [`Conversation`]: the message store, the single owner of all turns
//! - [`CalculationContext`]: benefit figures forwarded to the chat function
//! - [`ChatTransport`]: where live answers come from
//!
//! Everything here is free of timers and layout; the streaming and scroll
//! machinery lives in `elterngeld-chat`.

pub mod context;
pub mod conversation;
pub mod message;
pub mod transport;

pub use context::CalculationContext;
pub use conversation::{Conversation, ConversationError};
pub use message::{Message, MessageId, Role};
pub use transport::{
    ByteStream, ChatRequest, ChatResult, ChatTransport, TransportError, WireMessage,
};
