//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories:
//! - Implementing business rules
//! - Validating input
//! - Translating storage failures into typed errors

pub mod blog;
pub mod password;
pub mod user;

pub use blog::{BlogFields, BlogService, BlogServiceError};
pub use password::{hash_password, verify_password};
pub use user::{validate_credentials, LoginInput, RegisterInput, UserService, UserServiceError};
