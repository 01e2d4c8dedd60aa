//! Telegram notification worker.
//!
//! Upstream services [`queue::enqueue`] notification identifiers onto a Redis
//! list; the [`dispatcher::Dispatcher`] drains that list, resolves each
//! identifier in PostgreSQL, sends the warning through the Telegram Bot API
//! and records every attempt in `telegram_logs`.

pub mod dispatcher;
pub mod link;
pub mod queue;
pub mod store;
pub mod telegram;
pub mod template;
