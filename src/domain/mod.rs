// Domain layer: the map aggregate, its records, and the ports the pipeline is built against.

pub mod document;
pub mod model;
pub mod ports;
