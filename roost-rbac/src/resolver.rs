//! Role x resource x action resolution.

use std::fmt;
use std::sync::Arc;

use roost_core::Principal;

use crate::errors::RbacError;
use crate::grants::{ActionRequest, GrantTable, Scope, Verb};

/// Resources guarded by the grant table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Hotels,
    Rooms,
    Stays,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Hotels => "hotels",
            Resource::Rooms => "rooms",
            Resource::Stays => "stays",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positive authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub action: Verb,
    pub scope: Scope,
    /// Field restrictions from the table. Carried, not enforced.
    pub attributes: Vec<String>,
}

impl Grant {
    pub fn any(action: Verb) -> Self {
        Self {
            action,
            scope: Scope::Any,
            attributes: vec!["*".to_string()],
        }
    }

    pub fn is_any(&self) -> bool {
        self.scope == Scope::Any
    }
}

impl GrantTable {
    /// Resolve `action` for `role` on `resource`.
    ///
    /// The first permission whose verb equals the requested verb wins. An
    /// explicitly scoped action (`read:any`) must also match the scope tag.
    pub fn resolve(&self, role: &str, resource: &str, action: &str) -> Result<Grant, RbacError> {
        let role_grants = self
            .role(role)
            .ok_or_else(|| RbacError::InvalidRole(role.to_string()))?;

        let resource_grants =
            role_grants
                .resource(resource)
                .ok_or_else(|| RbacError::ForbiddenResource {
                    role: role.to_string(),
                    resource: resource.to_string(),
                })?;

        let forbidden = || RbacError::Forbidden {
            role: role.to_string(),
            resource: resource.to_string(),
            action: action.to_string(),
        };

        let request: ActionRequest = action.parse().map_err(|_| forbidden())?;
        let entry = resource_grants
            .first_for(request.verb)
            .ok_or_else(forbidden)?;

        if let Some(scope) = request.scope {
            if scope != entry.permission.scope {
                return Err(forbidden());
            }
        }

        Ok(Grant {
            action: entry.permission.verb,
            scope: entry.permission.scope,
            attributes: entry.attributes.clone(),
        })
    }
}

/// Shared handle over the process-wide grant table.
#[derive(Debug, Clone)]
pub struct Rbac {
    table: Arc<GrantTable>,
}

impl Rbac {
    pub fn new(table: GrantTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn from_shared(table: Arc<GrantTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &GrantTable {
        &self.table
    }

    /// Resolve for a principal. Super admins skip the table entirely.
    pub fn authorize(
        &self,
        principal: &Principal,
        resource: Resource,
        action: &str,
    ) -> Result<Grant, RbacError> {
        if principal.super_admin {
            let request: ActionRequest = action.parse().map_err(|_| RbacError::Forbidden {
                role: principal.role.to_string(),
                resource: resource.to_string(),
                action: action.to_string(),
            })?;
            return Ok(Grant::any(request.verb));
        }

        let grant = self
            .table
            .resolve(principal.role.as_str(), resource.as_str(), action);
        if let Err(err) = &grant {
            tracing::debug!(
                principal = %principal.id,
                role = %principal.role,
                resource = resource.as_str(),
                action,
                error = %err,
                "Access denied"
            );
        }
        grant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{builtin_grants, compile_grants};
    use roost_core::Role;

    fn table() -> GrantTable {
        builtin_grants().unwrap()
    }

    fn principal(role: &str, hotel: Option<&str>) -> Principal {
        Principal::new("u-1", Role::new(role), hotel.map(str::to_string)).unwrap()
    }

    #[test]
    fn unknown_role_and_resource_never_grant() {
        let t = table();
        assert_eq!(
            t.resolve("pirate", "hotels", "read"),
            Err(RbacError::InvalidRole("pirate".into()))
        );
        assert!(matches!(
            t.resolve("guest", "hotels", "read"),
            Err(RbacError::ForbiddenResource { .. })
        ));
        assert!(matches!(
            t.resolve("hotelier", "invoices", "read"),
            Err(RbacError::ForbiddenResource { .. })
        ));
    }

    #[test]
    fn missing_verb_is_forbidden() {
        let t = table();
        assert!(matches!(
            t.resolve("hotelier", "hotels", "create"),
            Err(RbacError::Forbidden { .. })
        ));
        assert!(matches!(
            t.resolve("guest", "stays", "delete"),
            Err(RbacError::Forbidden { .. })
        ));
        assert!(matches!(
            t.resolve("admin", "hotels", "destroy"),
            Err(RbacError::Forbidden { .. })
        ));
    }

    #[test]
    fn bare_actions_resolve_to_declared_scope() {
        let t = table();
        let g = t.resolve("hotelier", "hotels", "update").unwrap();
        assert_eq!(g.action, Verb::Update);
        assert_eq!(g.scope, Scope::Own);
        assert_eq!(g.attributes.len(), 3);

        let g = t.resolve("admin", "rooms", "delete").unwrap();
        assert!(g.is_any());
    }

    #[test]
    fn scoped_actions_must_match_scope_tag() {
        let t = table();
        assert!(t.resolve("admin", "hotels", "read:any").is_ok());
        assert!(matches!(
            t.resolve("hotelier", "hotels", "read:any"),
            Err(RbacError::Forbidden { .. })
        ));
        let own = t.resolve("hotelier", "rooms", "read:own").unwrap();
        assert_eq!(own.scope, Scope::Own);
    }

    #[test]
    fn verbs_that_share_a_prefix_do_not_match() {
        let t = compile_grants([(
            "clerk".to_string(),
            "clerk.json".to_string(),
            r#"{ "rooms": { "read:any": ["*"] } }"#.to_string(),
        )])
        .unwrap();
        assert!(matches!(
            t.resolve("clerk", "rooms", "rea"),
            Err(RbacError::Forbidden { .. })
        ));
        assert!(matches!(
            t.resolve("clerk", "rooms", "readAll"),
            Err(RbacError::Forbidden { .. })
        ));
    }

    #[test]
    fn super_admin_bypasses_the_table() {
        let rbac = Rbac::new(table());
        let p = principal("pirate", None).with_super_admin(true);
        let g = rbac.authorize(&p, Resource::Hotels, "create").unwrap();
        assert_eq!(g.scope, Scope::Any);
        assert_eq!(g.action, Verb::Create);

        let plain = principal("pirate", None);
        assert!(matches!(
            rbac.authorize(&plain, Resource::Hotels, "create"),
            Err(RbacError::InvalidRole(_))
        ));
    }

    #[test]
    fn authorize_uses_principal_role() {
        let rbac = Rbac::new(table());
        let hotelier = principal("hotelier", Some("h-1"));
        let g = rbac.authorize(&hotelier, Resource::Stays, "create").unwrap();
        assert_eq!(g.scope, Scope::Own);

        let guest = principal("guest", None);
        assert!(matches!(
            rbac.authorize(&guest, Resource::Rooms, "read"),
            Err(RbacError::ForbiddenResource { .. })
        ));
    }
}
