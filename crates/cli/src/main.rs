// bsheet - brokerage book CLI over a remote spreadsheet workspace

mod commands;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use brokersheet_store::StoreError;

use commands::invoice::InvoiceArgs;
use commands::tx::TxAddArgs;
use exit_codes::{
    store_exit_code, EXIT_ERROR, EXIT_NOT_FOUND, EXIT_STORE, EXIT_SUCCESS, EXIT_USAGE,
    EXIT_VALIDATION,
};

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_COMMIT_HASH"),
        ")"
    )
}

#[derive(Parser)]
#[command(name = "bsheet")]
#[command(about = "Brokerage back-office over a remote spreadsheet book")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Workspace (spreadsheet) id; overrides the saved login
    #[arg(long, global = true, env = "BROKERSHEET_SPREADSHEET_ID")]
    spreadsheet_id: Option<String>,

    /// API key; overrides the saved login
    #[arg(long, global = true, env = "BROKERSHEET_API_KEY")]
    api_key: Option<String>,

    /// Suppress progress output on stderr
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save workspace credentials (from --spreadsheet-id / --api-key)
    #[command(after_help = "\
Example:
  bsheet login --spreadsheet-id 1AbC... --api-key AIza... --label 'main book'")]
    Login {
        /// Free-form label shown by `bsheet whoami`
        #[arg(long)]
        label: Option<String>,
    },

    /// Delete saved credentials
    Logout,

    /// Show which workspace commands run against
    Whoami {
        #[arg(long)]
        json: bool,
    },

    /// Ensure the period table and both masters exist with canonical headers
    #[command(after_help = "\
Idempotent: a table that already conforms is left untouched, a missing
one is created, and a non-conforming header row is overwritten.")]
    Init {
        /// Period table (default: the current financial year)
        #[arg(long)]
        period: Option<String>,
    },

    /// Record and maintain buy/sell transactions
    Tx {
        #[command(subcommand)]
        command: TxCommands,
    },

    /// Company master
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },

    /// Product master
    Product {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Compute a period brokerage invoice
    #[command(after_help = "\
Exit code 4 means the filter matched no transactions - a legitimate
result, distinct from an error.

Examples:
  bsheet invoice --company Acme --from 2024-05-01 --to 2024-05-31 --rate 10 --preview
  bsheet invoice --company Acme --from 2024-05-01 --to 2024-05-31 --rate 0.5 --policy percent --json")]
    Invoice(InvoiceArgs),
}

#[derive(Subcommand)]
enum TxCommands {
    /// Append one transaction to its financial-year table
    Add(TxAddArgs),

    /// List normalized transactions for a period
    List {
        /// Period table (default: the current financial year)
        #[arg(long)]
        period: Option<String>,

        /// Emit one JSON array on stdout
        #[arg(long)]
        json: bool,

        /// Write CSV with canonical headers to a file
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },

    /// Overwrite fields of the row at a position
    #[command(after_help = "\
Positions are 1-based sheet rows (the header is row 1, data starts at 2)
and go stale whenever a row is deleted; list again before updating.

Example:
  bsheet tx update --position 4 --field qty=125 --field remarks='25.5 paid'")]
    Update {
        #[arg(long)]
        position: u32,

        /// Period table (default: the current financial year)
        #[arg(long)]
        period: Option<String>,

        /// Field to overwrite, `name=value`; repeatable
        #[arg(long, value_name = "NAME=VALUE", required = true)]
        field: Vec<String>,
    },

    /// Delete the row at a position, shifting later rows up
    Delete {
        #[arg(long)]
        position: u32,

        /// Period table (default: the current financial year)
        #[arg(long)]
        period: Option<String>,
    },
}

#[derive(Subcommand)]
enum CompanyCommands {
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        city: String,
    },
    List {
        #[arg(long)]
        json: bool,
    },
    /// Rename a company or change its city (addressed by current name)
    Update {
        #[arg(long)]
        name: String,

        #[arg(long)]
        new_name: Option<String>,

        #[arg(long)]
        city: Option<String>,
    },
    Delete {
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum ProductCommands {
    Add {
        #[arg(long)]
        code: String,

        #[arg(long)]
        name: String,
    },
    List {
        #[arg(long)]
        json: bool,
    },
    /// Re-code or rename a product (addressed by current code)
    Update {
        #[arg(long)]
        code: String,

        #[arg(long)]
        new_code: Option<String>,

        #[arg(long)]
        name: Option<String>,
    },
    Delete {
        #[arg(long)]
        code: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        spreadsheet_id,
        api_key,
        quiet,
        command,
    } = cli;
    let open = || commands::open_store(spreadsheet_id.clone(), api_key.clone());

    match command {
        Commands::Login { label } => {
            commands::login::cmd_login(spreadsheet_id.clone(), api_key.clone(), label, quiet)
        }
        Commands::Logout => commands::login::cmd_logout(quiet),
        Commands::Whoami { json } => {
            commands::login::cmd_whoami(spreadsheet_id.clone(), api_key.clone(), json)
        }
        Commands::Init { period } => commands::init::cmd_init(&open()?, period, quiet),
        Commands::Tx { command } => match command {
            TxCommands::Add(args) => commands::tx::cmd_tx_add(&open()?, args, quiet),
            TxCommands::List { period, json, csv } => {
                commands::tx::cmd_tx_list(&open()?, period, json, csv, quiet)
            }
            TxCommands::Update {
                position,
                period,
                field,
            } => commands::tx::cmd_tx_update(&open()?, period, position, field, quiet),
            TxCommands::Delete { position, period } => {
                commands::tx::cmd_tx_delete(&open()?, period, position, quiet)
            }
        },
        Commands::Company { command } => match command {
            CompanyCommands::Add { name, city } => {
                commands::company::cmd_company_add(&open()?, name, city, quiet)
            }
            CompanyCommands::List { json } => commands::company::cmd_company_list(&open()?, json),
            CompanyCommands::Update {
                name,
                new_name,
                city,
            } => commands::company::cmd_company_update(&open()?, name, new_name, city, quiet),
            CompanyCommands::Delete { name } => {
                commands::company::cmd_company_delete(&open()?, name, quiet)
            }
        },
        Commands::Product { command } => match command {
            ProductCommands::Add { code, name } => {
                commands::product::cmd_product_add(&open()?, code, name, quiet)
            }
            ProductCommands::List { json } => commands::product::cmd_product_list(&open()?, json),
            ProductCommands::Update {
                code,
                new_code,
                name,
            } => commands::product::cmd_product_update(&open()?, code, new_code, name, quiet),
            ProductCommands::Delete { code } => {
                commands::product::cmd_product_delete(&open()?, code, quiet)
            }
        },
        Commands::Invoice(args) => commands::invoice::cmd_invoice(&open()?, args, quiet),
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_USAGE,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_VALIDATION,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_NOT_FOUND,
            message: msg.into(),
            hint: None,
        }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_STORE,
            message: msg.into(),
            hint: None,
        }
    }

    #[allow(dead_code)]
    pub fn other(msg: impl Into<String>) -> Self {
        Self {
            code: EXIT_ERROR,
            message: msg.into(),
            hint: None,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        let hint = match &err {
            StoreError::NotAuthenticated => Some(
                "run `bsheet login`, or set BROKERSHEET_SPREADSHEET_ID and BROKERSHEET_API_KEY"
                    .to_string(),
            ),
            StoreError::NotFound { .. } => {
                Some("run `bsheet init` to create canonical tables".to_string())
            }
            _ => None,
        };
        Self {
            code: store_exit_code(&err),
            message: err.to_string(),
            hint,
        }
    }
}
