//! Capability checks for the REST layer.
//!
//! Handlers never inspect roles directly; they ask an [`AuthorizationPort`]
//! whether the current caller holds a named capability. The port is injected
//! at composition time so tests can swap in permissive or denying stand-ins.

use axum::http::HeaderMap;

use folio_store::RecordId;

/// Request header carrying the caller role.
pub const ROLE_HEADER: &str = "x-api-role";

/// Caller role resolved from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Unauthenticated reader.
    #[default]
    Public,
    /// May create records.
    Author,
    /// May create and edit records.
    Editor,
    /// Full access including delete.
    Admin,
}

/// The authenticated (or anonymous) caller of a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Caller {
    pub role: Role,
}

impl Caller {
    /// Resolve the caller from request headers. Missing or unrecognized
    /// role headers fall back to an anonymous public caller.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let role = headers
            .get(ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|value| match value.to_ascii_lowercase().as_str() {
                "author" => Role::Author,
                "editor" => Role::Editor,
                "admin" => Role::Admin,
                other => {
                    if other != "public" {
                        tracing::debug!(role = other, "unrecognized role header, treating as public");
                    }
                    Role::Public
                }
            })
            .unwrap_or_default();

        Self { role }
    }
}

/// Capability checks consulted before any mutating operation.
pub trait AuthorizationPort: Send + Sync {
    /// May the caller create records of the managed type?
    fn can_edit_records(&self, caller: &Caller) -> bool;

    /// May the caller edit this specific record?
    fn can_edit_record(&self, caller: &Caller, id: RecordId) -> bool;

    /// May the caller permanently delete records?
    fn can_delete_records(&self, caller: &Caller) -> bool;
}

/// Role-based authorizer used by the application.
pub struct RoleAuthorizer;

impl AuthorizationPort for RoleAuthorizer {
    fn can_edit_records(&self, caller: &Caller) -> bool {
        matches!(caller.role, Role::Author | Role::Editor | Role::Admin)
    }

    fn can_edit_record(&self, caller: &Caller, _id: RecordId) -> bool {
        // No per-record ownership model; editing any record takes editor rights.
        matches!(caller.role, Role::Editor | Role::Admin)
    }

    fn can_delete_records(&self, caller: &Caller) -> bool {
        matches!(caller.role, Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn caller(role: Role) -> Caller {
        Caller { role }
    }

    #[test]
    fn missing_header_is_public() {
        let headers = HeaderMap::new();
        assert_eq!(Caller::from_headers(&headers).role, Role::Public);
    }

    #[test]
    fn role_header_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLE_HEADER, HeaderValue::from_static("EDITOR"));
        assert_eq!(Caller::from_headers(&headers).role, Role::Editor);
    }

    #[test]
    fn unknown_role_falls_back_to_public() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLE_HEADER, HeaderValue::from_static("superuser"));
        assert_eq!(Caller::from_headers(&headers).role, Role::Public);
    }

    #[test]
    fn author_can_create_but_not_edit_or_delete() {
        let authz = RoleAuthorizer;
        let author = caller(Role::Author);
        assert!(authz.can_edit_records(&author));
        assert!(!authz.can_edit_record(&author, 1));
        assert!(!authz.can_delete_records(&author));
    }

    #[test]
    fn editor_can_edit_but_not_delete() {
        let authz = RoleAuthorizer;
        let editor = caller(Role::Editor);
        assert!(authz.can_edit_records(&editor));
        assert!(authz.can_edit_record(&editor, 1));
        assert!(!authz.can_delete_records(&editor));
    }

    #[test]
    fn admin_has_all_capabilities() {
        let authz = RoleAuthorizer;
        let admin = caller(Role::Admin);
        assert!(authz.can_edit_records(&admin));
        assert!(authz.can_edit_record(&admin, 1));
        assert!(authz.can_delete_records(&admin));
    }

    #[test]
    fn public_has_no_mutating_capabilities() {
        let authz = RoleAuthorizer;
        let public = caller(Role::Public);
        assert!(!authz.can_edit_records(&public));
        assert!(!authz.can_edit_record(&public, 1));
        assert!(!authz.can_delete_records(&public));
    }
}
