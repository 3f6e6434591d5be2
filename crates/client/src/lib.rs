//! Orchard Client - device-local cart and wishlist storage.
//!
//! This crate is the storage-backed variant of the cart/wishlist layer: a
//! durable key→JSON store scoped to one device, with a broadcast change hub
//! so every mounted consumer (badges, list views) converges after any write
//! without polling.
//!
//! The remote, identity-scoped layer in `orchard-storefront` is the
//! authoritative model; this crate covers guest/offline use where no account
//! exists. The two are deliberately not merged.
//!
//! # Modules
//!
//! - [`store`] - Persistent key→JSON store with change notification
//! - [`notify`] - Broadcast change hub (level-triggered re-sync hints)
//! - [`cart`] - Typed cart/wishlist operations over the store
//! - [`badge`] - Count consumers that re-derive on change signals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod badge;
pub mod cart;
pub mod notify;
pub mod store;

pub use badge::{BadgeCounts, BadgeWatcher};
pub use cart::{GuestCart, GuestCartLine};
pub use notify::{ChangeHub, StoreChange};
pub use store::LocalStore;
