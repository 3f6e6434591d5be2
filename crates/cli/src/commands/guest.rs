//! Offline guest cart commands.
//!
//! Drives the durable client-side cart: state lives in JSON files under the
//! state directory and survives across invocations, the same way a guest's
//! cart survives page loads.
//!
//! # Environment Variables
//!
//! - `ORCHARD_STATE_DIR` - Directory for guest state (default `.orchard`)

use rust_decimal::Decimal;

use orchard_client::{BadgeWatcher, GuestCart, GuestCartLine, LocalStore};
use orchard_core::{CurrencyCode, Price, ProductId};

/// Default state directory when `ORCHARD_STATE_DIR` is unset.
const DEFAULT_STATE_DIR: &str = ".orchard";

/// Open the guest cart over the on-disk store.
///
/// # Errors
///
/// Never fails today; the store degrades to memory-only when the directory
/// cannot be created. The `Result` keeps the call site uniform with the
/// database commands.
pub fn open_cart() -> Result<GuestCart, Box<dyn std::error::Error>> {
    let dir =
        std::env::var("ORCHARD_STATE_DIR").unwrap_or_else(|_| DEFAULT_STATE_DIR.to_string());
    let store = LocalStore::open(&dir);
    Ok(GuestCart::new(store))
}

/// Add a product to the cart (aggregates with an existing line).
pub fn add(cart: &GuestCart, product: &str, name: &str, price: Decimal, quantity: u32) {
    cart.add_line(GuestCartLine {
        id: ProductId::from(product),
        name: name.to_string(),
        image: None,
        price,
        discount: None,
        quantity,
    });

    tracing::info!(product, quantity, "Added to guest cart");
}

/// Set a product's quantity; zero removes the line.
pub fn set_quantity(cart: &GuestCart, product: &str, quantity: u32) {
    cart.set_quantity(&ProductId::from(product), quantity);
    tracing::info!(product, quantity, "Updated guest cart");
}

/// Toggle wishlist membership and report the new state.
pub fn toggle_wishlist(cart: &GuestCart, product: &str) {
    let wanted = cart.toggle_wishlist(&ProductId::from(product));
    tracing::info!(product, wanted, "Toggled wishlist");
}

/// Print the cart, wishlist, and badge counts.
pub fn show(cart: &GuestCart) {
    let watcher = BadgeWatcher::new(cart.store());
    let counts = watcher.counts();

    #[allow(clippy::print_stdout)]
    {
        println!("Cart ({} units):", counts.cart);
        for line in cart.lines() {
            let unit = Price::new(line.price, CurrencyCode::default());
            println!(
                "  {} x{}  {}  ({} each)",
                line.id,
                line.quantity,
                unit.line_total(line.quantity).display(),
                unit.display()
            );
        }

        println!("Wishlist ({} products):", counts.wishlist);
        for id in cart.wishlist() {
            println!("  {id}");
        }
    }
}

/// Empty the guest cart (wishlist is untouched).
pub fn clear(cart: &GuestCart) {
    cart.clear();
    tracing::info!("Cleared guest cart");
}
