use serde::{Deserialize, Serialize};

/// Marketplace account roles.
///
/// The wire format (token payload and backend API) carries the numeric
/// codes, not the names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Role {
    Admin,
    SuperAdmin,
    Wholesaler,
    Retailer,
}

impl Role {
    pub fn code(self) -> u8 {
        match self {
            Role::Admin => 1,
            Role::SuperAdmin => 2,
            Role::Wholesaler => 3,
            Role::Retailer => 4,
        }
    }

    /// Admins and super-admins may act on other accounts.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    /// Where the storefront lands after a session for this role is issued.
    pub fn landing_route(self) -> &'static str {
        match self {
            Role::Admin | Role::SuperAdmin => "/admin",
            Role::Wholesaler => "/wholesale",
            Role::Retailer => "/shop",
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> u8 {
        role.code()
    }
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Role::Admin),
            2 => Ok(Role::SuperAdmin),
            3 => Ok(Role::Wholesaler),
            4 => Ok(Role::Retailer),
            other => Err(format!("unknown role code: {}", other)),
        }
    }
}
