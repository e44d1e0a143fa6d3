//! Review bot — polls the Practicum homework API and reports status changes
//! to Telegram.

pub mod channels;
pub mod config;
pub mod error;
pub mod logging;
pub mod poller;
pub mod practicum;
pub mod status;
