//! storage-cli — composition root for the site storage layer.
//!
//! Builds the one storage handle the process uses (SQLite by default, or the
//! seeded in-memory store) and runs a single inspection command against it.
//!
//! Run:
//! ```bash
//! # sqlite at ./data/site.db (default)
//! cargo run -p storage-cli -- testimonials list
//!
//! # in-memory store, json logs
//! STORAGE_PROVIDER=memory LOG_FORMAT=json cargo run -p storage-cli -- contacts list
//! ```
//!
//! Configuration: See `config.rs` for all environment variables.

mod config;

use std::process;
use std::sync::Arc;

use domain::adapters::memory_storage::InMemoryStorage;
use domain::{NewContact, NewTestimonial, NewUser, RecordId, SharedStorage, Storage};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn print_usage() {
    eprintln!(
        "{}\n\nUsage:\n  storage-cli users get <id>\n  storage-cli users find <username>\n  storage-cli users create <username> <password>\n  storage-cli contacts list\n  storage-cli contacts create <name> <email> <message> [--phone <phone>]\n  storage-cli testimonials list\n  storage-cli testimonials create <name> <title> <company> <rating> <message> [--image <url>]",
        domain::about()
    );
}

#[tokio::main]
async fn main() {
    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    init_tracing(&cfg);
    cfg.warn_if_ephemeral();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        print_usage();
        return;
    }

    let storage = match build_storage(&cfg) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to initialize storage");
            process::exit(1);
        }
    };

    match run(&storage, &args).await {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(CliError::Usage(msg)) => {
            eprintln!("error: {}", msg);
            print_usage();
            process::exit(2);
        }
        Err(CliError::Output(msg)) => {
            error!(error = %msg, "failed to encode output");
            process::exit(1);
        }
        Err(CliError::Storage(e)) => {
            error!(error = %e, "storage operation failed");
            process::exit(1);
        }
    }
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

// Construct the process-wide storage handle. Called once; the handle is then
// passed to everything that needs storage.
fn build_storage(cfg: &config::Config) -> Result<SharedStorage, domain::StorageError> {
    match cfg.storage_provider {
        #[cfg(feature = "sqlite")]
        config::StorageProvider::Sqlite => {
            ensure_parent_dir(&cfg.db_path)?;
            let store = sqlite_adapter::SqliteStorage::open(&cfg.db_path)?;
            info!(path = %cfg.db_path.display(), "using sqlite storage");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "sqlite"))]
        config::StorageProvider::Sqlite => {
            tracing::warn!("built without the `sqlite` feature; using in-memory storage");
            Ok(Arc::new(InMemoryStorage::new()))
        }
        config::StorageProvider::Memory => {
            info!("using in-memory storage");
            Ok(Arc::new(InMemoryStorage::new()))
        }
    }
}

/// Create the directory holding the database file if it is missing.
#[cfg(feature = "sqlite")]
fn ensure_parent_dir(db_path: &std::path::Path) -> Result<(), domain::StorageError> {
    match db_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir).map_err(|e| {
            domain::StorageError::Backend(format!(
                "cannot create database directory {}: {e}",
                dir.display()
            ))
        }),
        _ => Ok(()),
    }
}

#[derive(Debug)]
enum CliError {
    Usage(String),
    Output(String),
    Storage(domain::StorageError),
}

impl From<domain::StorageError> for CliError {
    fn from(e: domain::StorageError) -> Self {
        CliError::Storage(e)
    }
}

fn usage<T>(msg: impl Into<String>) -> Result<T, CliError> {
    Err(CliError::Usage(msg.into()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string(value).map_err(|e| CliError::Output(e.to_string()))
}

/// Split `--flag <value>` options off the positional arguments.
fn take_flag(rest: &[String], flag: &str) -> Result<(Vec<String>, Option<String>), CliError> {
    let mut positional = Vec::new();
    let mut value = None;
    let mut i = 0;
    while i < rest.len() {
        if rest[i] == flag {
            if i + 1 >= rest.len() {
                return usage(format!("{} requires a value", flag));
            }
            value = Some(rest[i + 1].clone());
            i += 2;
        } else if rest[i].starts_with("--") {
            return usage(format!("unknown argument: {}", rest[i]));
        } else {
            positional.push(rest[i].clone());
            i += 1;
        }
    }
    Ok((positional, value))
}

/// Execute one command and return the lines to print.
async fn run<S: Storage>(storage: &S, args: &[String]) -> Result<Vec<String>, CliError> {
    let (Some(entity), Some(action)) = (args.first(), args.get(1)) else {
        return usage("expected <entity> <action>");
    };
    let rest = &args[2..];

    match (entity.as_str(), action.as_str()) {
        ("users", "get") => {
            let [id] = rest else {
                return usage("users get takes <id>");
            };
            let Ok(id) = id.parse::<RecordId>() else {
                return usage(format!("invalid id: {}", id));
            };
            match storage.get_user(id).await? {
                Some(user) => Ok(vec![to_json(&user)?]),
                None => Ok(vec!["not found".into()]),
            }
        }
        ("users", "find") => {
            let [username] = rest else {
                return usage("users find takes <username>");
            };
            match storage.get_user_by_username(username).await? {
                Some(user) => Ok(vec![to_json(&user)?]),
                None => Ok(vec!["not found".into()]),
            }
        }
        ("users", "create") => {
            let [username, password] = rest else {
                return usage("users create takes <username> <password>");
            };
            let user = storage
                .create_user(NewUser {
                    username: username.clone(),
                    password: password.clone(),
                })
                .await?;
            Ok(vec![to_json(&user)?])
        }
        ("contacts", "list") => storage
            .get_contacts()
            .await?
            .iter()
            .map(to_json)
            .collect(),
        ("contacts", "create") => {
            let (positional, phone) = take_flag(rest, "--phone")?;
            let [name, email, message] = positional.as_slice() else {
                return usage("contacts create takes <name> <email> <message>");
            };
            let contact = storage
                .create_contact(NewContact {
                    name: name.clone(),
                    email: email.clone(),
                    phone,
                    message: message.clone(),
                })
                .await?;
            Ok(vec![to_json(&contact)?])
        }
        ("testimonials", "list") => storage
            .get_testimonials()
            .await?
            .iter()
            .map(to_json)
            .collect(),
        ("testimonials", "create") => {
            let (positional, image_url) = take_flag(rest, "--image")?;
            let [name, title, company, rating, message] = positional.as_slice() else {
                return usage(
                    "testimonials create takes <name> <title> <company> <rating> <message>",
                );
            };
            let testimonial = storage
                .create_testimonial(NewTestimonial {
                    name: name.clone(),
                    title: title.clone(),
                    company: company.clone(),
                    message: message.clone(),
                    rating: rating.clone(),
                    image_url,
                })
                .await?;
            Ok(vec![to_json(&testimonial)?])
        }
        (entity, action) => usage(format!("unknown command: {} {}", entity, action)),
    }
}
