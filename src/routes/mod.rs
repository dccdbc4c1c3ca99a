//! src/routes/mod.rs
mod error_chain_fmt;
mod health_check;
mod send_email;
mod tweets;

pub use error_chain_fmt::*;
pub use health_check::*;
pub use send_email::*;
pub use tweets::*;
