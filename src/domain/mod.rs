//! Domain layer: the completion gate, money types, submission requests and the
//! backend port they are sent through.

pub mod gate;
pub mod money;
pub mod ports;
pub mod receipt;
pub mod request;
