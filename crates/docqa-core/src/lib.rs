#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod chunker;
pub mod config;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod refusal;
pub mod timeout;
pub mod traits;
pub mod types;

pub use error::{Error, ProviderFailure, Result};
