use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::PermissionParseError;

/// The bare verb of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Read,
    Create,
    Update,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Read => "read",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Delete => "delete",
        }
    }
}

impl FromStr for Verb {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Verb::Read),
            "create" => Ok(Verb::Create),
            "update" => Ok(Verb::Update),
            "delete" => Ok(Verb::Delete),
            other => Err(PermissionParseError::UnknownVerb(other.to_string())),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a permission covers only the caller's own records or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Own,
    Any,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Own => "own",
            Scope::Any => "any",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured permission key: `read`, `read:any`, `update:own`, ...
///
/// A key without a scope tag is `own`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub verb: Verb,
    pub scope: Scope,
}

impl Permission {
    pub fn new(verb: Verb, scope: Scope) -> Self {
        Self { verb, scope }
    }
}

impl FromStr for Permission {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, scope) = match s.split_once(':') {
            Some((verb, tag)) => {
                let scope = match tag {
                    "any" => Scope::Any,
                    "own" => Scope::Own,
                    other => return Err(PermissionParseError::UnknownScope(other.to_string())),
                };
                (verb, scope)
            }
            None => (s, Scope::Own),
        };
        Ok(Self {
            verb: verb.parse()?,
            scope,
        })
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Scope::Own => f.write_str(self.verb.as_str()),
            Scope::Any => write!(f, "{}:any", self.verb),
        }
    }
}

/// The action a route asks for: a verb, optionally pinned to a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRequest {
    pub verb: Verb,
    pub scope: Option<Scope>,
}

impl FromStr for ActionRequest {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(':') {
            let p: Permission = s.parse()?;
            Ok(Self {
                verb: p.verb,
                scope: Some(p.scope),
            })
        } else {
            Ok(Self {
                verb: s.trim().parse()?,
                scope: None,
            })
        }
    }
}

/// One permission key together with its attribute restrictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEntry {
    pub permission: Permission,
    pub attributes: Vec<String>,
}

/// Permissions of one role on one resource, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceGrants {
    entries: Vec<PermissionEntry>,
}

impl ResourceGrants {
    pub fn new(entries: Vec<PermissionEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PermissionEntry] {
        &self.entries
    }

    /// First entry whose verb matches structurally.
    pub fn first_for(&self, verb: Verb) -> Option<&PermissionEntry> {
        self.entries.iter().find(|e| e.permission.verb == verb)
    }
}

/// resource -> permissions for one role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleGrants {
    resources: HashMap<String, ResourceGrants>,
}

impl RoleGrants {
    pub fn new(resources: HashMap<String, ResourceGrants>) -> Self {
        Self { resources }
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceGrants> {
        self.resources.get(name)
    }

    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}

/// role -> resource -> permission -> attributes.
///
/// Built once at startup and shared read-only behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantTable {
    roles: HashMap<String, RoleGrants>,
}

impl GrantTable {
    pub fn new(roles: HashMap<String, RoleGrants>) -> Self {
        Self { roles }
    }

    pub fn role(&self, name: &str) -> Option<&RoleGrants> {
        self.roles.get(name)
    }

    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_keys_parse_structurally() {
        let p: Permission = "read:any".parse().unwrap();
        assert_eq!(p, Permission::new(Verb::Read, Scope::Any));

        let p: Permission = "update".parse().unwrap();
        assert_eq!(p, Permission::new(Verb::Update, Scope::Own));
        assert_eq!(p.to_string(), "update");

        assert!(matches!(
            "readAll".parse::<Permission>(),
            Err(PermissionParseError::UnknownVerb(v)) if v == "readAll"
        ));
        assert!(matches!(
            "read:some".parse::<Permission>(),
            Err(PermissionParseError::UnknownScope(_))
        ));
    }

    #[test]
    fn action_requests_keep_explicit_scope_only() {
        let bare: ActionRequest = "delete".parse().unwrap();
        assert_eq!(bare.scope, None);

        let scoped: ActionRequest = "read:any".parse().unwrap();
        assert_eq!(scoped.verb, Verb::Read);
        assert_eq!(scoped.scope, Some(Scope::Any));
    }

    #[test]
    fn first_for_respects_declaration_order() {
        let grants = ResourceGrants::new(vec![
            PermissionEntry {
                permission: "create".parse().unwrap(),
                attributes: vec!["*".into()],
            },
            PermissionEntry {
                permission: "read:any".parse().unwrap(),
                attributes: vec!["name".into()],
            },
        ]);
        let entry = grants.first_for(Verb::Read).unwrap();
        assert_eq!(entry.permission.scope, Scope::Any);
        assert_eq!(entry.attributes, vec!["name".to_string()]);
        assert!(grants.first_for(Verb::Delete).is_none());
    }
}
