//! Snippetbox: a server-rendered pastebin.
//!
//! Layout follows ports and adapters: [`domain`] holds the rules and ports,
//! [`inbound`] serves HTML over HTTP, [`outbound`] stores data in PostgreSQL
//! or memory, and [`server`] wires them together behind [`middleware`].

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use middleware::Trace;
