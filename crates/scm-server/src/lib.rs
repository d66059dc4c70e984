//! HTTP RPC surface for the datanode registry, built on top of
//! [`scm_core::registry::NodeRegistry`].

pub mod api;
pub mod error;
pub mod handlers;
pub mod server;
