//! Ownership checks layered on top of a resolved grant.

use roost_core::Principal;

use crate::errors::RbacError;
use crate::grants::Scope;
use crate::resolver::Grant;

/// Allow or deny access to a record owned by `owner_hotel_id`.
///
/// `any` grants always pass. `own` grants pass only when the principal's hotel
/// is exactly the owner; a principal without a hotel never owns anything.
pub fn check_scope(
    grant: &Grant,
    principal: &Principal,
    owner_hotel_id: &str,
) -> Result<(), RbacError> {
    match grant.scope {
        Scope::Any => Ok(()),
        Scope::Own => match principal.hotel_id() {
            Some(own) if own == owner_hotel_id => Ok(()),
            _ => Err(RbacError::OutOfScope {
                owner: owner_hotel_id.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grants::Verb;
    use roost_core::Role;

    fn own_grant() -> Grant {
        Grant {
            action: Verb::Read,
            scope: Scope::Own,
            attributes: vec!["*".into()],
        }
    }

    fn hotelier(hotel: &str) -> Principal {
        Principal::new("u-1", Role::new(Role::HOTELIER), Some(hotel.to_string())).unwrap()
    }

    #[test]
    fn own_scope_is_exact_equality() {
        let g = own_grant();
        assert!(check_scope(&g, &hotelier("H1"), "H1").is_ok());
        assert!(check_scope(&g, &hotelier("H1"), "H2").is_err());
        assert!(check_scope(&g, &hotelier("H1"), "H10").is_err());
        assert!(check_scope(&g, &hotelier("H10"), "H1").is_err());
        assert!(check_scope(&g, &hotelier("h1"), "H1").is_err());
    }

    #[test]
    fn own_scope_without_affiliation_is_denied() {
        let guest = Principal::new("u-2", Role::new(Role::GUEST), None).unwrap();
        assert_eq!(
            check_scope(&own_grant(), &guest, "H1"),
            Err(RbacError::OutOfScope { owner: "H1".into() })
        );
    }

    #[test]
    fn any_scope_always_allows() {
        let g = Grant::any(Verb::Delete);
        assert!(check_scope(&g, &hotelier("H1"), "H2").is_ok());
    }
}
