pub mod factory;
pub mod server;
