//! # relay-types
//!
//! Wire format types for the nearby-relay discovery token relay.
//!
//! Shared by the relay server and its clients:
//! - [`Code`], [`CodeRange`] - Short numeric codes and the range they are drawn from
//! - [`SubmitRequest`], [`TokenResponse`] - JSON request and response bodies
//! - [`TypesError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod code;
mod error;
mod messages;

pub use code::{Code, CodeRange};
pub use error::TypesError;
pub use messages::{SubmitRequest, TokenResponse};
