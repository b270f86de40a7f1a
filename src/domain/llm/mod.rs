//! Judge model domain - completion capability and its request types

mod message;
mod provider;
mod request;

pub use message::{Message, MessageRole};
pub use provider::CompletionProvider;
pub use request::CompletionOptions;

#[cfg(test)]
pub use provider::mock::MockCompletionProvider;
