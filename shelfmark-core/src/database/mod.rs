pub mod ports;
pub mod postgres;
