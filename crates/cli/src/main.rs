//! Vitrine CLI - drive the demo storefront from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! vitrine list --search tenis --sort price-asc
//!
//! # Catalog counters
//! vitrine stats
//!
//! # Restock a product
//! vitrine add-stock p-001 30
//!
//! # Accounts and sessions
//! vitrine register -n "Ana Souza" -e ana@example.com -p 'Senha123' -r seller
//! vitrine login -e ana@example.com -p 'Senha123'
//! vitrine whoami
//! vitrine logout
//! ```
//!
//! State lives under `VITRINE_DATA_DIR` (default `.vitrine/`): one JSON
//! file for the durable store, one for the session.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use vitrine_store::AppState;
use vitrine_store::clock::SystemClock;
use vitrine_store::config::StoreConfig;
use vitrine_store::storage::JsonFileStore;

mod commands;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine demo storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the catalog (no-op if already seeded)
    Seed {
        /// Drop all products and reseed
        #[arg(long)]
        force: bool,
    },
    /// Show catalog statistics
    Stats,
    /// List products with search, filter, sort, and pagination
    List {
        /// Free-text search over name and description
        #[arg(short, long)]
        search: Option<String>,

        /// Category filter (calcados, roupas, acessorios, eletronicos, casa, esportes)
        #[arg(short, long)]
        category: Option<String>,

        /// Sort order (name-asc, price-desc, ...)
        #[arg(long)]
        sort: Option<String>,

        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Add stock to a product (multiples of 10, ceiling 1000)
    AddStock {
        /// Product id (`p-001`, ...)
        id: String,

        /// Units to add
        amount: u32,
    },
    /// Register a new account
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (min 8 chars, upper + lower + digit)
        #[arg(short, long)]
        password: String,

        /// Role (client, seller, admin)
        #[arg(short, long, default_value = "client")]
        role: String,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,

        /// Tax ID (CPF)
        #[arg(long)]
        tax_id: Option<String>,
    },
    /// Sign in and persist the session
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List all accounts (admin only)
    Users,
}

fn main() {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state()?;

    match cli.command {
        Commands::Seed { force } => commands::seed::run(&state, force)?,
        Commands::Stats => commands::catalog::stats(&state),
        Commands::List {
            search,
            category,
            sort,
            page,
        } => commands::catalog::list(&state, search, category.as_deref(), sort.as_deref(), page)?,
        Commands::AddStock { id, amount } => commands::stock::add(&state, &id, amount)?,
        Commands::Register {
            name,
            email,
            password,
            role,
            phone,
            tax_id,
        } => commands::account::register(&state, name, email, password, &role, phone, tax_id)?,
        Commands::Login { email, password } => commands::account::login(&state, &email, password)?,
        Commands::Logout => commands::account::logout(&state)?,
        Commands::Whoami => commands::account::whoami(&state)?,
        Commands::Users => commands::account::users(&state)?,
    }
    Ok(())
}

fn build_state() -> Result<AppState, Box<dyn std::error::Error>> {
    let data_dir = std::env::var("VITRINE_DATA_DIR")
        .map_or_else(|_| PathBuf::from(".vitrine"), PathBuf::from);

    let durable = Arc::new(JsonFileStore::new(data_dir.join("store.json")));
    let session = Arc::new(JsonFileStore::new(data_dir.join("session.json")));

    let state = AppState::new(
        durable,
        session,
        Arc::new(SystemClock),
        StoreConfig::from_env()?,
    );
    state.initialize()?;
    Ok(state)
}
