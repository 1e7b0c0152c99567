//! Auth-domain identifiers, credential kinds, and token snapshots.

pub mod id;
pub mod kind;
pub mod secret;
pub mod token;

pub use id::*;
pub use kind::*;
pub use secret::*;
pub use token::*;
