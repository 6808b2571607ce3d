//! CLI domain: parse, route, and presentation only.

mod parse;
mod presentation;
mod route;

pub use parse::{Cli, Commands};
pub use presentation::{format_menu_state, format_page};
pub use route::RunContext;
