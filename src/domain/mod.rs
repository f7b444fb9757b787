// Domain layer: report/fixture models and the ports the generator talks through.

pub mod model;
pub mod ports;
