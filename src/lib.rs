//! rosterdb - durable student records behind a JSON REST API

pub mod cli;
pub mod http_server;
pub mod observability;
pub mod storage;
pub mod store;
pub mod student;
