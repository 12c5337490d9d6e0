//! Model catalog and dispatch selection.
//!
//! This module maps a requested model name to how the request is fulfilled:
//! a redirect to a public image URL, or a relayed POST to an upstream API.

mod catalog;

pub use catalog::{Catalog, Dispatch, FieldSet, ModelSpec, RelayTarget};
