//! Veritas - command-line access to the assessment record store
//!
//! Every command runs against the remote document store when one is
//! configured and falls back to local storage otherwise. Commands that
//! read or write records say which backend served them.
//!
//! ## Commands
//!
//! - `status`: Show the configured backends
//! - `reconnect`: Re-enable the remote store and probe it
//! - `login`: Check a username and password
//! - `accounts`: List, add and delete accounts, change passwords
//! - `configs`: List, show and save teacher quiz configs
//! - `results`: List and add student results
//! - `export` / `import`: Whole-database backups

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use veritas_core::{
    open_store, Account, RecordStore, Role, Served, Settings, StudentResult, TeacherConfig,
};

#[derive(Parser)]
#[command(name = "veritas")]
#[command(author = "Veritas Developers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Assessment records with remote storage and local fallback", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory for local storage
    #[arg(long, global = true, env = "VERITAS_DATA_DIR", default_value = ".veritas")]
    data_dir: PathBuf,

    /// Ignore any configured remote store
    #[arg(long, global = true)]
    local_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which backends are configured and reachable
    Status,

    /// Re-enable the remote store and check that it answers
    Reconnect,

    /// Check credentials and print the matching account
    Login {
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Manage accounts
    Accounts {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Manage teacher quiz configs
    Configs {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Manage student results
    Results {
        #[command(subcommand)]
        action: ResultAction,
    },

    /// Write a backup of every record
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay a backup file into the store
    Import {
        /// Backup file written by `export`
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// List all accounts
    List,
    /// Create or overwrite an account
    Add {
        username: String,

        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// DIRECTOR, TEACHER or STUDENT
        #[arg(short, long)]
        role: Role,
    },
    /// Delete an account
    Delete { username: String },
    /// Change an account's password
    Passwd {
        username: String,

        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// List all configs
    List,
    /// Print the config for one subject and bimester
    Show { subject: String, bimester: String },
    /// Save a config from a JSON file
    Save {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum ResultAction {
    /// List all results
    List,
    /// Append a result from a JSON file
    Add {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    veritas_core::init_tracing(cli.json, level);

    let mut settings = Settings::from_env().with_data_dir(&cli.data_dir);
    if cli.local_only {
        settings = settings.local_only();
    }

    let store = open_store(&settings)
        .await
        .context("Failed to open record store")?;
    let seeded = store
        .bootstrap()
        .context("Failed to start record store")?
        .wait()
        .await
        .context("Failed to check for an administrator")?;
    if seeded {
        info!("default administrator created");
    }

    match cli.command {
        Commands::Status => cmd_status(&store, &settings),
        Commands::Reconnect => cmd_reconnect(&store).await,
        Commands::Login { username, password } => cmd_login(&store, &username, &password).await,
        Commands::Accounts { action } => match action {
            AccountAction::List => cmd_accounts_list(&store).await,
            AccountAction::Add {
                username,
                password,
                name,
                role,
            } => cmd_accounts_add(&store, Account::new(username, password, name, role)).await,
            AccountAction::Delete { username } => cmd_accounts_delete(&store, &username).await,
            AccountAction::Passwd {
                username,
                current,
                new,
            } => cmd_accounts_passwd(&store, &username, &current, &new).await,
        },
        Commands::Configs { action } => match action {
            ConfigAction::List => cmd_configs_list(&store).await,
            ConfigAction::Show { subject, bimester } => {
                cmd_configs_show(&store, &subject, &bimester).await
            }
            ConfigAction::Save { file } => cmd_configs_save(&store, &file).await,
        },
        Commands::Results { action } => match action {
            ResultAction::List => cmd_results_list(&store).await,
            ResultAction::Add { file } => cmd_results_add(&store, &file).await,
        },
        Commands::Export { output } => cmd_export(&store, output.as_deref()).await,
        Commands::Import { file } => cmd_import(&store, &file).await,
    }
}

/// Tell the user when an answer came from local storage.
fn note_backend<T>(served: &Served<T>) {
    if let Some(reason) = &served.fallback {
        eprintln!("(served from local storage: {})", reason);
    }
}

fn read_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn cmd_status(store: &RecordStore, settings: &Settings) -> Result<()> {
    println!("Local storage: {}", settings.data_dir.display());
    if store.is_offline() {
        println!("Remote store:  not configured");
    } else if store.remote_path_open() {
        println!("Remote store:  enabled");
    } else {
        println!("Remote store:  disabled (run `veritas reconnect`)");
    }
    Ok(())
}

async fn cmd_reconnect(store: &RecordStore) -> Result<()> {
    let outcome = store.probe_reconnect().await;
    let message = outcome.message.as_deref().unwrap_or("connected");
    if !outcome.success {
        bail!("Reconnect failed: {}", message);
    }
    println!("Reconnected: {}", message);
    Ok(())
}

async fn cmd_login(store: &RecordStore, username: &str, password: &str) -> Result<()> {
    match store.authenticate(username, password).await {
        Some(account) => {
            println!("Welcome, {} ({})", account.name, account.role);
            Ok(())
        }
        None => bail!("Invalid username or password"),
    }
}

async fn cmd_accounts_list(store: &RecordStore) -> Result<()> {
    let served = store.list_accounts().await;
    note_backend(&served);

    if served.value.is_empty() {
        println!("No accounts found.");
        return Ok(());
    }
    for account in &served.value {
        println!("{:<20} {:<9} {}", account.username, account.role, account.name);
    }
    Ok(())
}

async fn cmd_accounts_add(store: &RecordStore, account: Account) -> Result<()> {
    let username = account.username.clone();
    let served = store
        .save_account(account)
        .await
        .context("Failed to save account")?;
    note_backend(&served);
    println!("Saved account '{}' ({})", username, served.backend);
    Ok(())
}

async fn cmd_accounts_delete(store: &RecordStore, username: &str) -> Result<()> {
    let served = store
        .delete_account(username)
        .await
        .with_context(|| format!("Failed to delete account '{}'", username))?;
    note_backend(&served);
    println!("Deleted account '{}' ({})", username, served.backend);
    Ok(())
}

async fn cmd_accounts_passwd(
    store: &RecordStore,
    username: &str,
    current: &str,
    new: &str,
) -> Result<()> {
    let served = store
        .update_password(username, current, new)
        .await
        .context("Failed to change password")?;
    note_backend(&served);
    println!("Password changed for '{}' ({})", username, served.backend);
    Ok(())
}

async fn cmd_configs_list(store: &RecordStore) -> Result<()> {
    let served = store.list_teacher_configs().await;
    note_backend(&served);

    if served.value.is_empty() {
        println!("No configs found.");
        return Ok(());
    }
    for config in &served.value {
        println!(
            "{:<24} {:<16} {} question(s){}",
            config.subject,
            config.bimester,
            config.questions.len(),
            config
                .teacher
                .as_deref()
                .map(|t| format!(", by {}", t))
                .unwrap_or_default()
        );
    }
    Ok(())
}

async fn cmd_configs_show(store: &RecordStore, subject: &str, bimester: &str) -> Result<()> {
    let served = store.find_teacher_config(subject, bimester).await;
    note_backend(&served);

    match served.value {
        Some(config) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        None => bail!("No config for {} / {}", subject, bimester),
    }
}

async fn cmd_configs_save(store: &RecordStore, file: &Path) -> Result<()> {
    let config: TeacherConfig = read_json_file(file)?;
    let label = format!("{} / {}", config.subject, config.bimester);
    let served = store
        .save_teacher_config(config)
        .await
        .context("Failed to save config")?;
    note_backend(&served);
    println!("Saved config {} ({})", label, served.backend);
    Ok(())
}

async fn cmd_results_list(store: &RecordStore) -> Result<()> {
    let served = store.list_student_results().await;
    note_backend(&served);

    if served.value.is_empty() {
        println!("No results found.");
        return Ok(());
    }
    for result in &served.value {
        println!(
            "{:<24} {:<8} {:<20} {:<12} {:>5.1}/{}",
            result.student_name,
            result.class_name.as_deref().unwrap_or("-"),
            result.subject,
            result.bimester,
            result.score,
            result.total_questions
        );
    }
    Ok(())
}

async fn cmd_results_add(store: &RecordStore, file: &Path) -> Result<()> {
    let result: StudentResult = read_json_file(file)?;
    let student = result.student_name.clone();
    let served = store
        .save_student_result(result)
        .await
        .context("Failed to save result")?;
    note_backend(&served);
    println!("Saved result for {} ({})", student, served.backend);
    Ok(())
}

async fn cmd_export(store: &RecordStore, output: Option<&Path>) -> Result<()> {
    let json = store.export_json().await.context("Failed to export")?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn cmd_import(store: &RecordStore, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    if !store.import_json(&json).await {
        bail!("Import of {} failed; see log for details", file.display());
    }
    println!("Imported {}", file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "veritas",
            "accounts",
            "list",
            "--local-only",
            "--data-dir",
            "/tmp/v",
        ])
        .unwrap();
        assert!(cli.local_only);
        assert_eq!(cli.data_dir, PathBuf::from("/tmp/v"));
        assert!(matches!(
            cli.command,
            Commands::Accounts {
                action: AccountAction::List
            }
        ));
    }

    #[test]
    fn parses_role_case_insensitively() {
        let cli = Cli::try_parse_from([
            "veritas", "accounts", "add", "prof", "-p", "pw", "-n", "Prof", "-r", "teacher",
        ])
        .unwrap();
        match cli.command {
            Commands::Accounts {
                action: AccountAction::Add { role, .. },
            } => assert_eq!(role, Role::Teacher),
            _ => panic!("expected accounts add"),
        }
    }

    #[test]
    fn rejects_unknown_role() {
        assert!(Cli::try_parse_from([
            "veritas", "accounts", "add", "x", "-p", "pw", "-n", "X", "-r", "janitor",
        ])
        .is_err());
    }
}
