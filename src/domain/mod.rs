// Domain layer: trip records and the ports the pipeline drives.

pub mod model;
pub mod ports;
