// Domain layer: plain data and the ports implemented by the HTTP adapters.

pub mod model;
pub mod ports;
