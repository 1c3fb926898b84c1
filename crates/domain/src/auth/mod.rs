//! OAuth2 credential types

mod token;
mod types;

pub use token::Token;
pub use types::{AuthResolution, GrantKind};
