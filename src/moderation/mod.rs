// Moderation: the Plat Vlaams-only gate in front of the chat model.
//
// Everything here is pure and synchronous except `pipeline::process_chat`,
// which awaits the model call. The HTTP endpoint and the CLI `chat` command
// both go through the same pipeline.

pub mod detectors;
pub mod language;
pub mod lexicon;
pub mod pipeline;
pub mod rate_limit;
pub mod refusal;
pub mod tokenizer;

pub use pipeline::{process_chat, ChatMessage, ChatOutcome, ModerationVerdict, Role};
