// Adapters layer: concrete implementations for external systems (http sink, storage, clock).

pub mod clock;
pub mod http;
pub mod storage;
