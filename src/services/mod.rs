//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the feed, alerting, chat, search, and export logic so
//! route handlers stay focused on protocol translation. Background tasks
//! (feed ticker, agent simulation, upstream sync) live next to the state
//! they mutate.

pub mod agents;
pub mod alert;
pub mod analytics;
pub mod catalog;
pub mod chatbot;
pub mod export;
pub mod feed;
pub mod hub;
pub mod mock;
pub mod search;
pub mod upstream;
