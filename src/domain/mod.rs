// Domain layer: row and page models plus the ports the executor talks through.

pub mod model;
pub mod ports;
