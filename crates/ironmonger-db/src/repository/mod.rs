//! # Repository Module
//!
//! Database repositories for Ironmonger.
//!
//! ## Who Writes What
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories vs Ledger                               │
//! │                                                                         │
//! │  ProductRepository ─── create / update prices / delete                  │
//! │  SupplierRepository ── create / update / delete                         │
//! │  ClientRepository ──── create / update / delete                         │
//! │  SettingsRepository ── key/value upserts                                │
//! │                                                                         │
//! │  SaleRepository ────────────┐                                           │
//! │  PurchaseOrderRepository ───┼── read only                               │
//! │  ReportRepository ──────────┘                                           │
//! │                                                                         │
//! │  Stock, sales and orders only change through Ledger (crate::ledger)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Catalog CRUD, SKU generation, search
//! - [`supplier::SupplierRepository`] - Suppliers
//! - [`client::ClientRepository`] - Clients (individuals and businesses)
//! - [`sale::SaleRepository`] - Recorded sales and their lines
//! - [`purchase_order::PurchaseOrderRepository`] - Purchase orders and their lines
//! - [`settings::SettingsRepository`] - Company details
//! - [`report::ReportRepository`] - Dashboard and finance figures

pub mod client;
pub mod product;
pub mod purchase_order;
pub mod report;
pub mod sale;
pub mod settings;
pub mod supplier;
