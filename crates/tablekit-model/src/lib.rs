//! Native store shapes for tablekit.
//!
//! These types mirror the wide-column store's JSON protocol: the tagged
//! [`AttributeValue`] union, the request and response structs of the eight
//! primitives tablekit issues, and the error codes a backend reports. They
//! carry no behaviour beyond (de)serialization, so every transport speaks the
//! same shapes.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use attribute_value::AttributeValue;
pub use error::{BackendError, BackendErrorCode};
pub use operations::StoreOperation;
pub use types::Item;
