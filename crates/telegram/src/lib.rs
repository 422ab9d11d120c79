//! Telegram integration: Bot API client and the channel-gating bot.
//!
//! - [`client`] -- thin reqwest wrapper over the Bot API methods we use.
//! - [`types`] -- the subset of Bot API update objects we deserialize.
//! - [`commands`] -- chat command parsing.
//! - [`bot`] -- long-polling loop, command handlers, access revocation.

pub mod bot;
pub mod client;
pub mod commands;
pub mod types;

pub use bot::{revoke_access, Bot, BotError};
pub use client::{TelegramClient, TelegramError};
