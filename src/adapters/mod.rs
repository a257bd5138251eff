// Adapters layer: concrete implementations for external systems (http source, credentials, object stores).

pub mod auth;
pub mod http;
pub mod storage;
