//! Cart domain vocabulary stored through tablekit.
//!
//! [`registry`] holds the closed enumerations whose wire strings are persisted
//! in cart records; [`landing`] holds the landing-source aggregate and the
//! entry-point cache write.
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod landing;
pub mod registry;

pub use landing::{ENTRY_POINT_ATTRIBUTE, EntryPoint, LandingSourceDetails};
pub use registry::RegistryError;
