//! Inbound adapters that translate browser requests into domain service
//! calls while keeping framework details at the edge.
//!
//! The HTML handlers live under [`http`].

pub mod http;
