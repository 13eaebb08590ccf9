//! User profile and role models

use serde::{Deserialize, Serialize};

/// Application role stored on the user's profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    #[default]
    User,
    Admin,
}

impl AppRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::User => "user",
            AppRole::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AppRole::Admin)
    }
}

impl std::fmt::Display for AppRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AppRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(AppRole::User),
            "admin" => Ok(AppRole::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<AppRole>(), Ok(AppRole::Admin));
        assert_eq!("User".parse::<AppRole>(), Ok(AppRole::User));
        assert!("owner".parse::<AppRole>().is_err());
    }

    #[test]
    fn test_default_role_is_user() {
        assert_eq!(AppRole::default(), AppRole::User);
        assert!(!AppRole::User.is_admin());
        assert!(AppRole::Admin.is_admin());
    }
}
