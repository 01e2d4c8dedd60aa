//! HTTP surface used by upstream services to schedule notifications and
//! hand out Telegram subscription links.

pub mod routes;
pub mod state;
