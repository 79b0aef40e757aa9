use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Viewer,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Viewer => "viewer",
        }
    }

    pub const fn allows(self, permission: Permission) -> bool {
        match self {
            Self::Admin => true,
            Self::Manager => !matches!(permission, Permission::DeleteAll | Permission::Backup),
            Self::Viewer => matches!(permission, Permission::Read | Permission::Export),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Export,
    Import,
    Edit,
    DeleteAll,
    SendNotifications,
    ManageVehicles,
    Backup,
}

impl Permission {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Export => "export",
            Self::Import => "import",
            Self::Edit => "edit",
            Self::DeleteAll => "delete_all",
            Self::SendNotifications => "send_notifications",
            Self::ManageVehicles => "manage_vehicles",
            Self::Backup => "backup",
        }
    }
}

/// The user a command runs on behalf of.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Actor {
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn require(&self, permission: Permission) -> ClientResult<()> {
        if self.role.allows(permission) {
            return Ok(());
        }
        tracing::warn!(
            user = %self.username,
            role = self.role.as_str(),
            permission = permission.as_str(),
            "permission denied"
        );
        Err(ClientError::permission_denied(
            &self.username,
            self.role.as_str(),
            permission.as_str(),
        ))
    }
}

/// Resolves the acting user against the configured user list.
///
/// With no users configured the local operator acts as admin.
pub fn resolve_actor(settings: &Settings, username: Option<&str>) -> ClientResult<Actor> {
    let requested = username.map(str::trim).filter(|name| !name.is_empty());

    if settings.users.is_empty() {
        return Ok(Actor {
            username: requested.unwrap_or("local").to_string(),
            role: Role::Admin,
        });
    }

    let Some(name) = requested else {
        return Err(ClientError::unknown_user("(none)"));
    };

    settings
        .users
        .iter()
        .find(|entry| entry.username == name)
        .map(|entry| Actor {
            username: entry.username.clone(),
            role: entry.role,
        })
        .ok_or_else(|| ClientError::unknown_user(name))
}
