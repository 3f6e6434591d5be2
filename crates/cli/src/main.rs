//! Orchard CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! orchard-cli migrate
//!
//! # Seed the product catalog with demo data
//! orchard-cli seed
//!
//! # Work with the offline guest cart (stored on disk)
//! orchard-cli guest add m1 --name "Walnut Desk" --price 120.00
//! orchard-cli guest set-quantity m1 3
//! orchard-cli guest wishlist m1
//! orchard-cli guest show
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the product catalog
//! - `guest` - Inspect and mutate the local guest cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "orchard-cli")]
#[command(author, version, about = "Orchard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Seed the product catalog with demo data
    Seed,
    /// Work with the offline guest cart
    Guest {
        #[command(subcommand)]
        action: GuestAction,
    },
}

#[derive(Subcommand)]
enum GuestAction {
    /// Add a product to the guest cart
    Add {
        /// Product handle (e.g. `m1`)
        product: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Unit price, e.g. `120.00`
        #[arg(short, long)]
        price: rust_decimal::Decimal,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a product's quantity (0 removes it)
    SetQuantity {
        /// Product handle
        product: String,

        /// New quantity
        quantity: u32,
    },
    /// Toggle a product's wishlist membership
    Wishlist {
        /// Product handle
        product: String,
    },
    /// Print the cart, wishlist, and badge counts
    Show,
    /// Empty the guest cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed => commands::seed::products().await?,
        Commands::Guest { action } => {
            let cart = commands::guest::open_cart()?;
            match action {
                GuestAction::Add {
                    product,
                    name,
                    price,
                    quantity,
                } => commands::guest::add(&cart, &product, &name, price, quantity),
                GuestAction::SetQuantity { product, quantity } => {
                    commands::guest::set_quantity(&cart, &product, quantity);
                }
                GuestAction::Wishlist { product } => {
                    commands::guest::toggle_wishlist(&cart, &product);
                }
                GuestAction::Show => commands::guest::show(&cart),
                GuestAction::Clear => commands::guest::clear(&cart),
            }
        }
    }
    Ok(())
}
