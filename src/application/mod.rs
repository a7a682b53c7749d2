//! # Application Layer
//!
//! Contains the core logic of the bot: the quote cache, date and text matching,
//! quote resolution and message routing.

pub mod cache;
pub mod dates;
pub mod fuzzy;
pub mod invocation;
pub mod logging;
pub mod resolver;
pub mod router;
