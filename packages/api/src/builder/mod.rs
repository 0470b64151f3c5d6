//! Fluent request builder
//!
//! A chain of setters over [`fetchkit_client::RequestConfig`] ending in a
//! terminal verb that returns a [`fetchkit_client::PendingRequest`].

pub mod auth;
pub mod body;
pub mod core;
pub mod headers;
pub mod methods;
pub mod options;

pub use self::core::{BodyNotSet, BodySet, ContentType, FetchBuilder};
pub use headers::{AcceptValue, header};
