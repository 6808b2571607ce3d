//! Integration tests for the click-censor background and content processes

mod command_queue;
mod config_integration;
mod context_menu;
mod messaging;
