// Domain layer: transaction model, value objects and ports. No I/O here.

pub mod model;
pub mod ports;
pub mod tax_id;
pub mod transaction_type;
