// Domain layer: backend payload models and the seams between components.

pub mod model;
pub mod ports;
