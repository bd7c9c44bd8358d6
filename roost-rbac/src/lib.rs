//! roost-rbac: role grant tables, permission resolution and ownership scope checks.
//!
//! A [`GrantTable`] is loaded once at startup (see [`loader`]) and shared
//! behind [`Rbac`]. Handlers resolve a [`Grant`] for the caller, fetch the
//! record, then run [`check_scope`] against the record's owning hotel.

pub mod errors;
pub mod grants;
pub mod loader;
pub mod resolver;
pub mod scope;

pub use errors::{GrantLoadError, PermissionParseError, RbacError};
pub use grants::{ActionRequest, GrantTable, Permission, PermissionEntry, Scope, Verb};
pub use loader::{builtin_grants, compile_grants, load_grants};
pub use resolver::{Grant, Rbac, Resource};
pub use scope::check_scope;
