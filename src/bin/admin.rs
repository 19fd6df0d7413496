//! CLI administration tool for auth-store.
//!
//! Inspects users, tokens and API keys in the configured PostgreSQL store.
//!
//! # Usage
//!
//! ```bash
//! # Look up a user by name or by nickname
//! cargo run --bin auth-admin -- user get alice
//! cargo run --bin auth-admin -- user nick al --origin slack
//!
//! # Look up a session token by value
//! cargo run --bin auth-admin -- token get <token>
//!
//! # Look up an API key by raw key or record id, or list keys
//! cargo run --bin auth-admin -- apikey get <key-or-id>
//! cargo run --bin auth-admin -- apikey list --limit 20 --offset 40
//!
//! # Check database connection
//! cargo run --bin auth-admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! See [`auth_store::config`]; `DATABASE_URL` is required.

use auth_store::config;
use auth_store::{AppError, AuthStore, telemetry};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde::Serialize;

/// CLI tool for inspecting auth records.
#[derive(Parser)]
#[command(name = "auth-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Look up users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Look up session tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Look up API keys
    Apikey {
        #[command(subcommand)]
        action: ApiKeyAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Show a user by name
    Get { name: String },

    /// Resolve a user from a nickname
    Nick {
        nickname: String,

        /// Namespace the nickname belongs to (e.g. "slack")
        #[arg(short, long, default_value = "")]
        origin: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Show a token by its value
    Get { value: String },
}

#[derive(Subcommand)]
enum ApiKeyAction {
    /// Show a key by raw key value or record id
    Get { key_or_id: String },

    /// List keys
    List {
        #[arg(short, long)]
        limit: Option<i64>,

        #[arg(short, long, default_value = "0")]
        offset: String,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    telemetry::init(&config.log_level, &config.log_format)?;
    config.print_summary();

    let auth = AuthStore::connect(&config)
        .await
        .context("Failed to connect to database")?;

    let outcome = match cli.command {
        Commands::User { action } => handle_user_action(action, &auth).await,
        Commands::Token { action } => handle_token_action(action, &auth).await,
        Commands::Apikey { action } => handle_api_key_action(action, &auth).await,
        Commands::Db { action } => {
            handle_db_action(action, &auth).await;
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("{} {}", format!("[{}]", e.code()).red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn handle_user_action(action: UserAction, auth: &AuthStore) -> Result<(), AppError> {
    let user = match action {
        UserAction::Get { name } => auth.users.get(&name).await?,
        UserAction::Nick { nickname, origin } => {
            auth.users.get_by_nickname(&nickname, &origin).await?
        }
    };

    print_record("User", &user)
}

async fn handle_token_action(action: TokenAction, auth: &AuthStore) -> Result<(), AppError> {
    match action {
        TokenAction::Get { value } => {
            let token = auth.tokens.get(&value).await?;
            print_record("Token", &token)?;

            if token.is_expired_at(chrono::Utc::now()) {
                println!("{}", "Token has expired".yellow());
            }
            Ok(())
        }
    }
}

async fn handle_api_key_action(action: ApiKeyAction, auth: &AuthStore) -> Result<(), AppError> {
    match action {
        ApiKeyAction::Get { key_or_id } => {
            let key = auth.api_keys.get_by_key_or_id(&key_or_id).await?;
            print_record("API key", &key)
        }
        ApiKeyAction::List { limit, offset } => {
            let keys = auth.api_keys.list(limit, offset).await?;
            let total = auth.api_keys.count().await?;

            println!(
                "{}",
                format!("API keys ({} shown, {} total)", keys.len(), total)
                    .bright_blue()
                    .bold()
            );
            println!();

            for key in keys {
                let status = if key.enabled {
                    "enabled".green()
                } else {
                    "disabled".red()
                };
                println!(
                    "  {}  {}  {}  {}",
                    key.id.as_deref().unwrap_or("-").cyan(),
                    key.user,
                    status,
                    key.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
                );
            }
            Ok(())
        }
    }
}

async fn handle_db_action(action: DbAction, auth: &AuthStore) {
    match action {
        DbAction::Check => {
            if auth.health_check().await {
                println!("{}", "Database connection OK".green().bold());
            } else {
                println!("{}", "Database connection FAILED".red().bold());
            }
        }
    }
}

fn print_record<T: Serialize>(title: &str, record: &T) -> Result<(), AppError> {
    println!("{}", title.bright_blue().bold());
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}
