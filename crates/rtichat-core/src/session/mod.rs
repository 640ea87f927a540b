//! Session domain module.
//!
//! This module contains all session-related domain models, the canonical
//! in-process store, and title derivation.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `Lifecycle`)
//! - `message`: Conversation message types (`Sender`, `Message`)
//! - `store`: Canonical session list and active pointer (`SessionStore`)
//! - `title`: Title derivation from a conversation's first message

mod message;
mod model;
mod store;
mod title;

// Re-export public API
pub use message::{AttachmentRef, Message, Sender};
pub use model::{Lifecycle, NEW_CHAT_TITLE, Session};
pub use store::SessionStore;
pub use title::derive_title;
