//! AWS SDK transport for tablekit.
//!
//! [`SdkTransport`] implements [`tablekit_core::Transport`] on top of
//! `aws-sdk-dynamodb`, so a [`tablekit_core::StoreClient`] can talk to
//! DynamoDB or any endpoint speaking its protocol.
#![allow(clippy::doc_markdown, clippy::module_name_repetitions)]

pub mod config;
pub mod convert;
pub mod transport;

pub use config::{AwsTransportConfig, StaticCredentials};
pub use transport::SdkTransport;
