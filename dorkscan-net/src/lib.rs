//! dorkscan Network Layer
//!
//! Everything that touches the network for a dork run:
//! - Proxy list normalization and round-robin selection
//! - HTTP client construction per proxy (with optional TLS verification)
//! - The search provider boundary and its typed errors
//! - A Google HTML search provider

pub mod google;
pub mod provider;
pub mod proxy;

pub use google::*;
pub use provider::*;
pub use proxy::*;
