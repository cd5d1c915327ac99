//! Agent Assist: role-routed chat assist backend.

pub mod actions;
pub mod assist;
pub mod config;
pub mod error;
pub mod language;
pub mod llm;
pub mod server;
