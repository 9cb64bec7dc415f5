//! `OpenAI` chat completions integration for the shine advisor.
//!
//! One request per turn: the full message list (system prompt, history, new
//! user message) goes out and the first choice's text comes back. No
//! streaming and no tool use.

mod client;
mod error;
mod types;

pub use client::OpenAiClient;
pub use error::OpenAiError;
pub use types::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChoiceMessage, WireMessage,
};
