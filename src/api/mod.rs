pub mod error;
mod server;
pub mod services;
pub mod state;
pub mod validation;

pub use server::{router, run};
