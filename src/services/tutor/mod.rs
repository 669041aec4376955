//! Smart tutor: a router agent classifies each chat turn and delegates it to
//! a translation, vocabulary or general language tutor agent.

pub mod confirmation;
pub mod prompts;
pub mod router;
pub mod schemas;
pub mod tools;

pub use router::run_tutor_router;
pub use schemas::{ConversationMessage, Intent, Role, TutorMessage};
