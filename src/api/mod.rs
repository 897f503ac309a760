//! HTTP plumbing for the gallery service.
//!
//! - [`Session`]: connection pool, access token and request dispatch
//! - [`ByteRange`]: `Range` header values for partial reads

pub mod range;
pub mod session;

pub use range::ByteRange;
pub use session::{Payload, ResponseBody, Session, ACCESS_TOKEN_HEADER};
