//! roost-core: framework-agnostic core types shared by every Roost crate.

pub mod config;
pub mod errors;
pub mod principal;

pub use config::{ConfigSnapshot, RoostConfig};
pub use errors::{ErrorKind, RoostError, RoostResult};
pub use principal::{Principal, PrincipalError, Role};
