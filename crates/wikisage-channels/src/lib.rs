//! # Wikisage Channels
//! Chat front-end implementations and the session router.
//!
//! A channel delivers `IncomingMessage`s and accepts `OutgoingMessage`s;
//! the router decides which events deserve an answer and which session
//! their history lives in.

pub mod repl;
pub mod router;
pub mod telegram;

pub use repl::ReplChannel;
pub use router::{RoutedQuery, SessionRouter};
pub use telegram::TelegramChannel;
