// src/session.rs
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt, fs,
    io::{self, Write},
    path::Path,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::timesheet_entry::TimesheetStatus;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session file I/O error: {context}")]
    Io {
        #[source]
        source: io::Error,
        context: String,
    },
    #[error("Session file is not valid JSON")]
    Json(#[from] serde_json::Error),
}

fn io_context<S: Into<String>>(source: io::Error, context: S) -> SessionError {
    SessionError::Io {
        source,
        context: context.into(),
    }
}

// --- Roles & Identity ---

/// Role string issued by the backend. Only read for display and branching, never changed here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Hr,
    Manager,
    Employee,
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Role::Admin,
            "HR" => Role::Hr,
            "MANAGER" => Role::Manager,
            "EMPLOYEE" => Role::Employee,
            _ => Role::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::Hr => "HR",
            Role::Manager => "MANAGER",
            Role::Employee => "EMPLOYEE",
            Role::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn has_role(&self, role: &Role) -> bool {
        &self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(&Role::Admin)
    }

    pub fn is_hr(&self) -> bool {
        self.has_role(&Role::Hr)
    }

    pub fn is_manager(&self) -> bool {
        self.has_role(&Role::Manager)
    }

    pub fn is_employee(&self) -> bool {
        self.has_role(&Role::Employee)
    }
}

pub(crate) fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

// --- Session ---

/// Bearer token plus the identity it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: Identity,
}

impl Session {
    pub fn new(token: &str, user: Identity) -> Self {
        Self {
            token: token.to_string(),
            user,
        }
    }

    /// Start-up: read the persisted session. A missing file means nobody is logged in.
    pub fn load(path: &Path) -> Result<Option<Session>, SessionError> {
        if !path.exists() {
            debug!("No session file at {:?}", path);
            return Ok(None);
        }
        let json_string = fs::read_to_string(path)
            .map_err(|e| io_context(e, format!("Failed to read session file: {:?}", path)))?;
        let session: Session = serde_json::from_str(&json_string)?;
        info!(
            "Restored session for {} ({})",
            session.user.email, session.user.role
        );
        Ok(Some(session))
    }

    pub fn persist(&self, path: &Path) -> Result<(), SessionError> {
        let json_string = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                io_context(e, format!("Failed to create directory for session file: {:?}", parent))
            })?;
        }
        let mut file = open_private(path)
            .map_err(|e| io_context(e, format!("Failed to create session file: {:?}", path)))?;
        file.write_all(json_string.as_bytes())
            .map_err(|e| io_context(e, format!("Failed to write session file: {:?}", path)))?;
        Ok(())
    }

    /// Logout: drop the persisted token. Clearing an absent session is not an error.
    pub fn clear(path: &Path) -> Result<(), SessionError> {
        match fs::remove_file(path) {
            Ok(()) => {
                info!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_context(e, format!("Failed to remove session file: {:?}", path))),
        }
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

// --- Listing Scope ---

/// Which timesheet listing the current identity is allowed to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimesheetScope {
    Own,
    Hr,
    Admin,
    Manager { status: Option<TimesheetStatus> },
}

impl TimesheetScope {
    pub fn for_identity(identity: &Identity, status: Option<TimesheetStatus>) -> Self {
        if identity.is_manager() {
            TimesheetScope::Manager { status }
        } else if identity.is_hr() {
            TimesheetScope::Hr
        } else if identity.is_admin() {
            TimesheetScope::Admin
        } else {
            TimesheetScope::Own
        }
    }

    pub fn endpoint(&self) -> String {
        match self {
            TimesheetScope::Own => "/api/timesheets".to_string(),
            TimesheetScope::Hr => "/api/hr/timesheets".to_string(),
            TimesheetScope::Admin => "/api/admin/timesheets".to_string(),
            TimesheetScope::Manager { status: None } => "/api/manager/timesheets".to_string(),
            TimesheetScope::Manager {
                status: Some(status),
            } => format!("/api/manager/timesheets/status/{}", status),
        }
    }
}

// The file holds a bearer token, so only the owner may read it.
#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; tighten a file left by an older run
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::File::create(path)
}
