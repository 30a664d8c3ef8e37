//! Workspace credential storage.
//!
//! Reads/writes ~/.config/brokersheet/auth.json (0600 on Unix). `bsheet
//! login` writes it once; every other command picks it up automatically.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Credentials for one spreadsheet workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Workspace (spreadsheet) identifier.
    pub spreadsheet_id: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Free-form label for display (`bsheet whoami`).
    #[serde(default)]
    pub label: Option<String>,
}

impl Credentials {
    pub fn new(spreadsheet_id: String, api_key: String) -> Self {
        Self {
            spreadsheet_id,
            api_key,
            label: None,
        }
    }
}

/// Returns the path to the credentials file.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("brokersheet/auth.json"))
}

/// Load saved credentials from disk.
/// Returns None if nothing is saved or the file is invalid.
pub fn load_credentials() -> Option<Credentials> {
    let path = auth_file_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Save credentials to disk.
/// Creates the parent directory if it doesn't exist.
/// Sets 0600 permissions on Unix.
pub fn save_credentials(creds: &Credentials) -> Result<(), String> {
    let path = auth_file_path().ok_or("Could not determine config directory")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let contents = serde_json::to_string_pretty(creds)
        .map_err(|e| format!("Failed to serialize credentials: {}", e))?;

    std::fs::write(&path, &contents).map_err(|e| format!("Failed to write auth file: {}", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, permissions)
            .map_err(|e| format!("Failed to set file permissions: {}", e))?;
    }

    Ok(())
}

/// Delete saved credentials.
pub fn delete_credentials() -> Result<(), String> {
    let Some(path) = auth_file_path() else {
        return Ok(());
    };
    if path.exists() {
        std::fs::remove_file(&path).map_err(|e| format!("Failed to delete auth file: {}", e))?;
    }
    Ok(())
}
