//! HuertoHogar Core - Shared domain types and business rules.
//!
//! This crate provides the types and pure logic used across all HuertoHogar
//! components:
//! - `storefront` - Public grocery store (catalog, cart, checkout, boleta)
//! - `admin` - Back-office for products, orders, users and comments
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains types, validation and arithmetic only - no HTTP
//! clients, no database access. The product, user and order services are
//! external; the binaries talk to them and hand the records to this crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, RUTs, statuses, ratings
//! - [`models`] - Records exchanged with the external REST services
//! - [`cart`] - Session-persisted shopping cart
//! - [`checkout`] - Subtotal, IVA, shipping and total computation
//! - [`catalog`] - Product listing filters and sort orders
//! - [`validation`] - Form validation with per-field error messages
//! - [`regions`] - Chilean administrative regions
//! - [`seed`] - Built-in demo catalog
//! - `content` - Markdown blog posts and pages (feature `content`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
#[cfg(feature = "content")]
pub mod content;
pub mod models;
pub mod regions;
pub mod seed;
pub mod types;
pub mod validation;

pub use types::*;
