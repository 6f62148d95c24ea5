//! Conversation Session Management
//!
//! An append-only [`Transcript`] with the persona as its first entry, and a
//! [`ConversationSession`] that owns one transcript for one owner.
//!
//! # Example
//!
//! ```rust,ignore
//! use confidant_core::conversation::ConversationSession;
//!
//! let mut session = ConversationSession::start("Alex", &persona, provider, memory).await;
//! let reply = session.respond("I feel anxious").await?;
//! println!("{}", reply.response);
//! ```

mod session;
mod transcript;

pub use session::{ConversationSession, GenerationSettings, TurnReply};
pub use transcript::{Role, Transcript, Turn};
