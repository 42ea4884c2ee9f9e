//! Shieldline CLI - drive the persisted cart and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Add two dome cameras
//! shieldline cart add --id cam1 --name "Dome camera" --price 1299 --quantity 2
//!
//! # Change or remove a line
//! shieldline cart update cam1 3
//! shieldline cart remove cam1
//!
//! # Show the cart (or as JSON)
//! shieldline cart show --json
//!
//! # Place the order
//! shieldline checkout --name "Dana Reyes" --email dana@example.com \
//!     --phone "+1 555 0100" --address "12 Harbor Rd"
//! ```
//!
//! The cart lives in `STOREFRONT_DATA_DIR` and survives between runs.
//! Checkout needs `STOREFRONT_API_BASE_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shieldline_core::{CartItem, Email, Price};
use shieldline_storefront::{AppState, StorefrontConfig};

mod commands;

#[derive(Parser)]
#[command(name = "shieldline")]
#[command(author, version, about = "Shieldline cart and checkout tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order
    Checkout {
        /// Customer name
        #[arg(long)]
        name: String,

        /// Customer email address
        #[arg(long)]
        email: Email,

        /// Customer phone number
        #[arg(long)]
        phone: String,

        /// Delivery or installation address
        #[arg(long)]
        address: String,

        /// Notes for the installer
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add units of a product
    Add {
        /// Product identifier
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Unit price, e.g. 1299 or 89.50
        #[arg(long)]
        price: Price,

        /// Image URL
        #[arg(long)]
        image: Option<String>,

        /// Product category
        #[arg(long)]
        category: Option<String>,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product's line
    Remove {
        /// Product identifier
        id: String,
    },
    /// Set a line's quantity (0 or less removes it)
    Update {
        /// Product identifier
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove every line
    Clear,
    /// Print the cart
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Initialize Sentry when a DSN is configured.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    Some(sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    )))
}

fn init_tracing() {
    // Logs go to stderr so command output on stdout stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shieldline_cli=info,shieldline_storefront=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry::integrations::tracing::layer())
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    let sentry_guard = init_sentry(&config);
    init_tracing();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Add {
                id,
                name,
                price,
                image,
                category,
                quantity,
            } => {
                let mut item = CartItem::new(id, name, price);
                if let Some(image) = image {
                    item = item.with_image(image);
                }
                if let Some(category) = category {
                    item = item.with_category(category);
                }
                commands::cart::add(&state, item, quantity)?;
            }
            CartAction::Remove { id } => commands::cart::remove(&state, id)?,
            CartAction::Update { id, quantity } => commands::cart::update(&state, id, quantity)?,
            CartAction::Clear => commands::cart::clear(&state)?,
            CartAction::Show { json } => commands::cart::show(&state, json)?,
        },
        Commands::Checkout {
            name,
            email,
            phone,
            address,
            notes,
        } => {
            let customer = commands::checkout::customer(name, email, phone, address, notes);
            commands::checkout::place_order(&state, customer).await?;
        }
    }
    Ok(())
}
