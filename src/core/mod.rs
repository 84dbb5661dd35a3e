//! Core library components.
//!
//! Session handling, credentials, vault access and the .env writer. Nothing
//! in here prints to the terminal or exits the process.

pub mod constants;
pub mod credential;
pub mod env;
pub mod http;
pub mod pipeline;
pub mod session;
pub mod shell;
pub mod vault;

#[cfg(test)]
pub(crate) mod testing;
