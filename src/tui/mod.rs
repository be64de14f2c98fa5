//! TUI module for the inbox
//!
//! Terminal user interface using Ratatui: the contact form and the admin
//! dashboard on two screens.

mod admin;
mod app;
mod contact;
mod input;
mod log_capture;
mod ui;
mod welcome;

pub use app::run;
pub use log_capture::LogBuffer;
