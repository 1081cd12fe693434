pub mod gateway;

pub use gateway::{GatewayError, HttpSignalGateway, MockSignalGateway, SignalGateway};
