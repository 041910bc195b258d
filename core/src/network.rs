pub mod endpoint;
pub mod http;
pub mod tls;
pub mod transport;
