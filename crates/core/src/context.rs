//! Account context passed explicitly into editors and destructive commands.
//!
//! The signed-in account's role decides what it may author. The context is a read-only
//! value built once per session by the caller; nothing in this crate reads it from global
//! state.

use crate::{AuthoringError, AuthoringResult};
use medsim_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of the signed-in account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Platform operator.
    SuperAdmin,
    /// Administrator of one organisation.
    OrgAdmin,
    /// Instructor running classes.
    Instructor,
    /// Learner. Read-only with respect to assets.
    Student,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::OrgAdmin => "org_admin",
            Self::Instructor => "instructor",
            Self::Student => "student",
        }
    }

    /// Parses a role from its string representation (case-insensitive).
    pub fn parse(s: &str) -> AuthoringResult<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            "org_admin" | "orgadmin" => Ok(Self::OrgAdmin),
            "instructor" => Ok(Self::Instructor),
            "student" => Ok(Self::Student),
            _ => Err(AuthoringError::InvalidInput(format!(
                "Invalid account role: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only description of who is editing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountContext {
    user_id: NonEmptyText,
    role: AccountRole,
    organization_id: Option<String>,
}

impl AccountContext {
    pub fn new(user_id: NonEmptyText, role: AccountRole) -> Self {
        Self {
            user_id,
            role,
            organization_id: None,
        }
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    pub fn role(&self) -> AccountRole {
        self.role
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    pub fn can_author_assets(&self) -> bool {
        !matches!(self.role, AccountRole::Student)
    }

    pub fn can_manage_invites(&self) -> bool {
        !matches!(self.role, AccountRole::Student)
    }

    pub(crate) fn require_authoring(&self) -> AuthoringResult<()> {
        if self.can_author_assets() {
            return Ok(());
        }
        tracing::warn!(user = %self.user_id, role = %self.role, "authoring refused");
        Err(AuthoringError::PermissionDenied {
            role: self.role,
            action: "author assets",
        })
    }

    pub(crate) fn require_invite_management(&self) -> AuthoringResult<()> {
        if self.can_manage_invites() {
            return Ok(());
        }
        tracing::warn!(user = %self.user_id, role = %self.role, "invite management refused");
        Err(AuthoringError::PermissionDenied {
            role: self.role,
            action: "manage invites",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: AccountRole) -> AccountContext {
        AccountContext::new(NonEmptyText::new("user-1").unwrap(), role)
    }

    #[test]
    fn students_cannot_author() {
        assert!(!ctx(AccountRole::Student).can_author_assets());
        let err = ctx(AccountRole::Student)
            .require_authoring()
            .expect_err("student refused");
        assert!(matches!(
            err,
            AuthoringError::PermissionDenied {
                role: AccountRole::Student,
                ..
            }
        ));
    }

    #[test]
    fn staff_roles_can_author() {
        for role in [
            AccountRole::SuperAdmin,
            AccountRole::OrgAdmin,
            AccountRole::Instructor,
        ] {
            assert!(ctx(role).require_authoring().is_ok());
            assert!(ctx(role).require_invite_management().is_ok());
        }
    }

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!(AccountRole::parse("Org-Admin").unwrap(), AccountRole::OrgAdmin);
        assert_eq!(AccountRole::parse("superadmin").unwrap(), AccountRole::SuperAdmin);
        assert!(AccountRole::parse("janitor").is_err());
    }

    #[test]
    fn organization_is_optional() {
        let plain = ctx(AccountRole::Instructor);
        assert_eq!(plain.organization_id(), None);
        let scoped = plain.with_organization("org-9");
        assert_eq!(scoped.organization_id(), Some("org-9"));
        assert_eq!(scoped.user_id(), "user-1");
    }
}
