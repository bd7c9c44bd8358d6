use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::errors::GrantLoadError;
use crate::grants::{GrantTable, Permission, PermissionEntry, ResourceGrants, RoleGrants};

/// Grant tables shipped with the crate, one JSON document per role.
const BUILTIN_ROLES: &[(&str, &str)] = &[
    ("admin", include_str!("../roles/admin.json")),
    ("hotelier", include_str!("../roles/hotelier.json")),
    ("guest", include_str!("../roles/guest.json")),
];

/// The built-in `admin`, `hotelier` and `guest` tables.
pub fn builtin_grants() -> Result<GrantTable, GrantLoadError> {
    compile_grants(
        BUILTIN_ROLES
            .iter()
            .map(|(role, json)| (role.to_string(), format!("<builtin>/{role}.json"), json.to_string())),
    )
}

/// Load every `<role>.json` file in `dir`; the file stem is the role name.
pub fn load_grants(dir: &Path) -> Result<GrantTable, GrantLoadError> {
    if !dir.is_dir() {
        return Err(GrantLoadError::MissingDirectory(dir.display().to_string()));
    }

    let io_err = |source| GrantLoadError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            entries.push(path);
        }
    }
    entries.sort();

    let mut sources = Vec::with_capacity(entries.len());
    for path in entries {
        let Some(role) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let contents = std::fs::read_to_string(&path).map_err(|source| GrantLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        sources.push((role.to_string(), path.display().to_string(), contents));
    }

    compile_grants(sources)
}

/// Build a table from `(role, origin, json)` triples.
pub fn compile_grants<I>(sources: I) -> Result<GrantTable, GrantLoadError>
where
    I: IntoIterator<Item = (String, String, String)>,
{
    let mut roles = HashMap::new();
    for (role, origin, contents) in sources {
        let doc: Value = serde_json::from_str(&contents).map_err(|source| GrantLoadError::Json {
            path: origin.clone(),
            source,
        })?;
        let grants = parse_role(&role, &doc)?;
        if roles.insert(role.clone(), grants).is_some() {
            return Err(GrantLoadError::DuplicateRole(role));
        }
    }

    let table = GrantTable::new(roles);
    tracing::info!(roles = table.role_count(), "Loaded role grants");
    Ok(table)
}

/// Parse one role document: `{ resource: { permissionKey: [attributes] } }`.
///
/// Key order inside each resource is kept as written.
pub fn parse_role(role: &str, doc: &Value) -> Result<RoleGrants, GrantLoadError> {
    let resources = doc.as_object().ok_or_else(|| GrantLoadError::NotAnObject {
        role: role.to_string(),
        what: "the role document".to_string(),
    })?;

    let mut out = HashMap::with_capacity(resources.len());
    for (resource, perms) in resources {
        let perms = perms.as_object().ok_or_else(|| GrantLoadError::NotAnObject {
            role: role.to_string(),
            what: format!("resource `{resource}`"),
        })?;

        let mut entries: Vec<PermissionEntry> = Vec::with_capacity(perms.len());
        for (key, attrs) in perms {
            let permission: Permission =
                key.parse().map_err(|source| GrantLoadError::InvalidPermission {
                    role: role.to_string(),
                    resource: resource.clone(),
                    key: key.clone(),
                    source,
                })?;

            // At most one key per verb.
            if entries.iter().any(|e| e.permission.verb == permission.verb) {
                return Err(GrantLoadError::DuplicateVerb {
                    role: role.to_string(),
                    resource: resource.clone(),
                    verb: permission.verb.to_string(),
                });
            }

            let attributes = parse_attributes(attrs).ok_or_else(|| {
                GrantLoadError::InvalidAttributes {
                    role: role.to_string(),
                    resource: resource.clone(),
                    key: key.clone(),
                }
            })?;

            entries.push(PermissionEntry {
                permission,
                attributes,
            });
        }

        out.insert(resource.clone(), ResourceGrants::new(entries));
    }

    Ok(RoleGrants::new(out))
}

fn parse_attributes(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grants::{Scope, Verb};

    fn source(role: &str, json: &str) -> (String, String, String) {
        (role.to_string(), format!("{role}.json"), json.to_string())
    }

    #[test]
    fn builtin_tables_load() {
        let table = builtin_grants().unwrap();
        assert_eq!(table.role_count(), 3);

        let hotelier = table.role("hotelier").unwrap();
        let hotels = hotelier.resource("hotels").unwrap();
        let update = hotels.first_for(Verb::Update).unwrap();
        assert_eq!(update.permission.scope, Scope::Own);
        assert!(update.attributes.contains(&"!electricityCost".to_string()));
        assert!(hotels.first_for(Verb::Create).is_none());
    }

    #[test]
    fn declaration_order_is_preserved() {
        let table = compile_grants([source(
            "clerk",
            r#"{ "rooms": { "update": [], "read:any": ["*"], "create": [] } }"#,
        )])
        .unwrap();
        let keys: Vec<String> = table
            .role("clerk")
            .unwrap()
            .resource("rooms")
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.permission.to_string())
            .collect();
        assert_eq!(keys, vec!["update", "read:any", "create"]);
    }

    #[test]
    fn malformed_tables_are_rejected() {
        let dup = compile_grants([source(
            "clerk",
            r#"{ "rooms": { "read": [], "read:any": [] } }"#,
        )]);
        assert!(matches!(dup, Err(GrantLoadError::DuplicateVerb { .. })));

        let bad_key = compile_grants([source("clerk", r#"{ "rooms": { "readAll": [] } }"#)]);
        assert!(matches!(bad_key, Err(GrantLoadError::InvalidPermission { .. })));

        let bad_attrs = compile_grants([source("clerk", r#"{ "rooms": { "read": "*" } }"#)]);
        assert!(matches!(bad_attrs, Err(GrantLoadError::InvalidAttributes { .. })));

        let not_obj = compile_grants([source("clerk", r#"[1, 2]"#)]);
        assert!(matches!(not_obj, Err(GrantLoadError::NotAnObject { .. })));

        let twice = compile_grants([source("clerk", "{}"), source("clerk", "{}")]);
        assert!(matches!(twice, Err(GrantLoadError::DuplicateRole(r)) if r == "clerk"));
    }

    #[test]
    fn loads_json_files_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("auditor.json"),
            r#"{ "stays": { "read:any": ["*"] } }"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let table = load_grants(dir.path()).unwrap();
        assert_eq!(table.role_count(), 1);
        assert!(table.role("auditor").unwrap().resource("stays").is_some());

        let missing = load_grants(&dir.path().join("nope"));
        assert!(matches!(missing, Err(GrantLoadError::MissingDirectory(_))));
    }

    #[test]
    fn unreadable_entries_fail_the_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("admin.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("clerk.json")).unwrap();

        let err = load_grants(dir.path()).unwrap_err();
        assert!(matches!(err, GrantLoadError::Io { ref path, .. } if path.ends_with("clerk.json")));
    }
}
