pub mod aggregate;
pub mod application;
pub mod gateway;
pub mod geo;
pub mod registry;
pub mod settings;
