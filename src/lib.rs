// VlaamsCodex: Plat Vlaams-only chat gate, release announcer and plats tooling.
//
// This is the library root. Each module corresponds to a major subsystem:
// moderation is the language gate, model talks to Ollama, web serves the
// chat endpoint, bot announces GitHub releases on Discord, runner drives
// the external `plats` CLI.

pub mod bot;
pub mod config;
pub mod model;
pub mod moderation;
pub mod output;
pub mod runner;
pub mod web;
