//! RocketShoes CLI - drive the persistent cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cart show
//!
//! # Add one unit of product 3
//! rs-cart add 3
//!
//! # Set product 3 to 2 units
//! rs-cart update 3 2
//!
//! # Remove product 3
//! rs-cart remove 3
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart restored from local storage
//! - `add` - Add one unit of a product (checked against live stock)
//! - `remove` - Remove a product's line item
//! - `update` - Set a line item's quantity (checked against live stock)
//!
//! Configuration comes from the environment (or `.env`); see
//! `rocketshoes_cart::config` for the variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocketshoes_core::ProductId;

mod commands;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New quantity (at least 1)
        amount: u32,
    },
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rocketshoes_cart=info,rs_cart=info".into());

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cart = commands::open_cart()?;

    match cli.command {
        Commands::Show => commands::cart::show(&cart),
        Commands::Add { product_id } => commands::cart::add(&cart, product_id).await?,
        Commands::Remove { product_id } => commands::cart::remove(&cart, product_id).await?,
        Commands::Update { product_id, amount } => {
            commands::cart::update(&cart, product_id, amount).await?;
        }
    }
    Ok(())
}
