pub mod endpoint;
pub mod request;

pub use endpoint::*;
pub use request::ApiResponse;
