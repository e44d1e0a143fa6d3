//! Yandex Practicum homework-status API: request and response shape checks.

pub mod client;
pub mod response;

pub use client::{PracticumClient, StatusApi};
pub use response::{TrackedRecord, cursor_of, validate};
