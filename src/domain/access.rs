//! Two-role access check in front of the screens.
//!
//! This is a gate for staff, not a security boundary: passwords are compared
//! as unsalted SHA-256 digests.

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Staff => f.write_str("staff"),
            Role::Viewer => f.write_str("viewer"),
        }
    }
}

/// The screens of the tool, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    NewCustomer,
    EditCustomer,
    RegisterPayment,
    DeletePayment,
    ListCustomers,
    Reports,
    Statement,
    Configuration,
}

impl Screen {
    pub const ALL: [Screen; 9] = [
        Screen::Dashboard,
        Screen::NewCustomer,
        Screen::EditCustomer,
        Screen::RegisterPayment,
        Screen::DeletePayment,
        Screen::ListCustomers,
        Screen::Reports,
        Screen::Statement,
        Screen::Configuration,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::NewCustomer => "New customer",
            Screen::EditCustomer => "Edit/delete customer",
            Screen::RegisterPayment => "Register payment",
            Screen::DeletePayment => "Delete payment",
            Screen::ListCustomers => "Customers",
            Screen::Reports => "Reports",
            Screen::Statement => "Customer statement",
            Screen::Configuration => "Configuration",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl Role {
    pub fn can_open(&self, screen: Screen) -> bool {
        match self {
            Role::Admin => true,
            Role::Staff => matches!(
                screen,
                Screen::Dashboard
                    | Screen::NewCustomer
                    | Screen::RegisterPayment
                    | Screen::ListCustomers
                    | Screen::Reports
                    | Screen::Statement
            ),
            Role::Viewer => matches!(
                screen,
                Screen::Dashboard | Screen::ListCustomers | Screen::Reports
            ),
        }
    }

    /// Screens shown in this role's menu.
    pub fn menu(&self) -> Vec<Screen> {
        Screen::ALL
            .iter()
            .copied()
            .filter(|s| self.can_open(*s))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub password_hash: String,
    pub display_name: String,
    pub role: Role,
}

/// Who is using the tool for this run.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub username: String,
    pub display_name: String,
    pub role: Role,
}

impl Session {
    /// Session used when authentication is turned off.
    pub fn local_admin() -> Self {
        Self {
            username: "local".to_string(),
            display_name: "Administrador".to_string(),
            role: Role::Admin,
        }
    }

    pub fn require(&self, screen: Screen) -> Result<()> {
        if self.role.can_open(screen) {
            Ok(())
        } else {
            Err(LedgerError::AccessDenied {
                role: self.role,
                screen,
            })
        }
    }
}

pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserDirectory {
    users: BTreeMap<String, UserAccount>,
}

impl Default for UserDirectory {
    /// `admin`/`admin` and `empleado`/`empleado123`. Meant to be replaced in
    /// the configuration file.
    fn default() -> Self {
        let mut users = BTreeMap::new();
        users.insert(
            "admin".to_string(),
            UserAccount {
                password_hash: "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918"
                    .to_string(),
                display_name: "Administrador".to_string(),
                role: Role::Admin,
            },
        );
        users.insert(
            "empleado".to_string(),
            UserAccount {
                password_hash: "ccc13e8ab0819e3ab61719de4071ecae6c1d3cd35dc48b91cad3481f20922f9f"
                    .to_string(),
                display_name: "Empleado".to_string(),
                role: Role::Staff,
            },
        );
        Self { users }
    }
}

impl UserDirectory {
    pub fn new(users: BTreeMap<String, UserAccount>) -> Self {
        Self { users }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Usernames match without regard to case, since configuration keys
    /// arrive lowercased.
    pub fn verify(&self, username: &str, password: &str) -> Result<Session> {
        let wanted = username.trim().to_lowercase();
        let (name, account) = self
            .users
            .iter()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .ok_or(LedgerError::InvalidCredentials)?;
        if !account
            .password_hash
            .eq_ignore_ascii_case(&hash_password(password))
        {
            return Err(LedgerError::InvalidCredentials);
        }
        Ok(Session {
            username: name.clone(),
            display_name: account.display_name.clone(),
            role: account.role,
        })
    }
}
