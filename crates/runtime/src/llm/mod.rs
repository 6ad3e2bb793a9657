//! Provider-agnostic model protocol: messages, tool calls, and the backend trait.

pub mod errors;
pub mod types;

pub use errors::ModelError;
pub use types::{
    Backend, Conversation, Message, ModelRequest, ModelResponse, Part, ProviderReply, Role,
    ToolCall, ToolResult, ToolSpec, Usage,
};
