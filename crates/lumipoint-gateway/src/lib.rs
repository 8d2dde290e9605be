// lumipoint-gateway: device-state HTTP gateway (upstream proxy or in-memory mock)

pub mod error;
pub mod gateway;
pub mod server;

pub use error::GatewayError;
pub use gateway::{Gateway, MockGateway, ProxyGateway};
pub use server::{GatewaySettings, router, serve, serve_on};
