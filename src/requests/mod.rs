//! provides the [`RequestTemplate`] parsed from a captured request and the per-candidate
//! [`Request`] built from it
mod request;
mod template;

pub use self::request::{Request, RequestId};
pub use self::template::RequestTemplate;
