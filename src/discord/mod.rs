//! Discord surface: slash commands and alert delivery.

pub mod alert_sender;
pub mod bot;
mod commands;
mod embeds;

pub use alert_sender::{AlertSink, DiscordAlertSink};
pub use bot::{Data, create_framework};
