//! Account operations behind the HTTP surface.

mod error;
mod requests;
mod service;

pub use error::ApiError;
pub use requests::{ListQuery, LoginRequest, RegisterRequest};
pub use service::AccountService;
