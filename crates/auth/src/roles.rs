use serde::{Deserialize, Serialize};

/// Role granted to a request's principal.
///
/// The role set is closed. Anything unrecognized degrades to `External`,
/// the least-privileged role; there is no way to name a role that grants
/// more than the known four.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hr,
    Manager,
    Security,
    #[default]
    External,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Hr, Role::Manager, Role::Security, Role::External];

    /// Parse a raw role label. Unrecognized or empty input is `External`.
    pub fn from_label(raw: &str) -> Role {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hr" => Role::Hr,
            "manager" => Role::Manager,
            "security" => Role::Security,
            _ => Role::External,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hr => "hr",
            Role::Manager => "manager",
            Role::Security => "security",
            Role::External => "external",
        }
    }

    /// Whether this role may mutate business data.
    pub fn can_write(&self) -> bool {
        matches!(self, Role::Hr | Role::Manager)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_label(role.as_str()), role);
        }
    }

    #[test]
    fn unknown_labels_degrade_to_external() {
        for raw in ["", "admin", "root", "HR2", "  "] {
            assert_eq!(Role::from_label(raw), Role::External);
        }
    }

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(Role::from_label(" HR "), Role::Hr);
        assert_eq!(Role::from_label("Manager"), Role::Manager);
    }

    #[test]
    fn write_access_is_hr_and_manager_only() {
        assert!(Role::Hr.can_write());
        assert!(Role::Manager.can_write());
        assert!(!Role::Security.can_write());
        assert!(!Role::External.can_write());
    }
}
