//! Workspace credential commands: login, logout, whoami.

use brokersheet_store::auth::{
    auth_file_path, delete_credentials, load_credentials, save_credentials,
};
use brokersheet_store::Credentials;

use super::print_json;
use crate::{exit_codes::EXIT_AUTH, CliError};

pub fn cmd_login(
    spreadsheet_id: Option<String>,
    api_key: Option<String>,
    label: Option<String>,
    quiet: bool,
) -> Result<(), CliError> {
    let (Some(id), Some(key)) = (spreadsheet_id, api_key) else {
        return Err(CliError::usage(
            "login needs both --spreadsheet-id and --api-key",
        ));
    };
    let id = super::validate::require("--spreadsheet-id", &id)?;
    let key = super::validate::require("--api-key", &key)?;

    let mut creds = Credentials::new(id, key);
    creds.label = label;
    save_credentials(&creds).map_err(CliError::io)?;

    if !quiet {
        let path = auth_file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        eprintln!("Saved credentials to {}", path);
    }
    Ok(())
}

pub fn cmd_logout(quiet: bool) -> Result<(), CliError> {
    delete_credentials().map_err(CliError::io)?;
    if !quiet {
        eprintln!("Deleted saved credentials");
    }
    Ok(())
}

/// Show the workspace commands would run against, with the key redacted.
/// Flags and env override the saved file here exactly as they do for real
/// commands.
pub fn cmd_whoami(
    spreadsheet_id: Option<String>,
    api_key: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let saved = load_credentials();
    let id = spreadsheet_id.or_else(|| saved.as_ref().map(|c| c.spreadsheet_id.clone()));
    let key = api_key.or_else(|| saved.as_ref().map(|c| c.api_key.clone()));
    let label = saved.and_then(|c| c.label);

    let (Some(id), Some(key)) = (id, key) else {
        return Err(CliError {
            code: EXIT_AUTH,
            message: "not logged in".into(),
            hint: Some(
                "run `bsheet login`, or set BROKERSHEET_SPREADSHEET_ID and BROKERSHEET_API_KEY"
                    .into(),
            ),
        });
    };

    if json {
        print_json(&serde_json::json!({
            "spreadsheetId": id,
            "apiKey": redact(&key),
            "label": label,
        }));
    } else {
        println!("workspace: {}", id);
        println!("api key:   {}", redact(&key));
        if let Some(label) = label {
            println!("label:     {}", label);
        }
    }
    Ok(())
}

fn redact(key: &str) -> String {
    // Counted in chars; a byte offset could land inside a multi-byte key.
    let len = key.chars().count();
    if len <= 4 {
        "****".to_string()
    } else {
        let tail: String = key.chars().skip(len - 4).collect();
        format!("****{}", tail)
    }
}
