//! Core types for vitrine
//!
//! Shared by the cache, knowledge and validator crates: the structured
//! record produced by the page-extraction collaborator and the chat
//! message types stored in conversation history.

mod types;

pub use types::{ChatMessage, ChatRole, ExtractedPage, PageData};
