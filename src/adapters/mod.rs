// Adapters layer: concrete implementations for external systems (report service, filesystem).

pub mod http;
pub mod storage;
