//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod decode_state;
mod encode_command;
mod replay;

pub use decode_state::DecodeState;
pub use encode_command::EncodeCommand;
pub use replay::Replay;
