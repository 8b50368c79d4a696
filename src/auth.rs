//! Credential-domain types: opaque secrets, the inbound credential pair, and the
//! credential-state instructions sent back to the caller.

pub mod credential;
pub mod instruction;
pub mod secret;

pub use credential::*;
pub use instruction::*;
pub use secret::*;
