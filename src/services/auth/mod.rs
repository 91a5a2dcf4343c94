pub mod claims;
pub mod factory;
pub mod trust_policy;
pub mod validator;

pub use claims::ClaimSet;
pub use factory::build_claims_validator;
pub use validator::{ClaimsValidator, TokenValidator, ValidationError};
