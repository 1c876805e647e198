// Adapters layer: concrete implementations of the domain ports.

pub mod discard;
pub mod failed_records;
pub mod local;
pub mod memory;
pub mod sqlite;
