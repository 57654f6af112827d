//! # ironmonger-db: Storage and Ledger for Ironmonger
//!
//! One SQLite file holds the catalog, the sales and purchase-order
//! ledger, and the store settings. Reads go through repositories; every
//! stock or money movement goes through the [`Ledger`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ironmonger Data Flow                             │
//! │                                                                         │
//! │  Caller (counter UI, REST handler, seed binary)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 ironmonger-db (THIS CRATE)                      │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐    │    │
//! │  │   │   Database    │   │  Repositories  │   │    Ledger     │    │    │
//! │  │   │   (pool.rs)   │   │                │   │  (ledger.rs)  │    │    │
//! │  │   │               │   │ products       │   │               │    │    │
//! │  │   │ SqlitePool    │◄──│ suppliers      │   │ record_sale   │    │    │
//! │  │   │ writer lock   │   │ clients        │   │ create_order  │    │    │
//! │  │   │ migrations    │   │ sales, orders  │   │ receive_order │    │    │
//! │  │   │               │   │ settings       │   │ settle_credit │    │    │
//! │  │   │               │   │ reports        │   │               │    │    │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘    │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     SQLite Database (WAL)                       │    │
//! │  │               ./ironmonger.db or IRONMONGER_DB_PATH             │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Store configuration from the environment
//! - [`pool`] - Connection pool, writer lock, repository accessors
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and ledger error types
//! - [`ledger`] - Sale, purchase order, reception, settlement
//! - [`repository`] - Catalog, ledger reads, settings, reports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ironmonger_db::{Database, StoreConfig};
//!
//! let db = Database::open(&StoreConfig::load()?).await?;
//!
//! let record = db.ledger().record_sale(&request).await?;
//! let kpis = db.reports().dashboard_kpis().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StoreConfig};
pub use error::{DbError, DbResult, LedgerError, LedgerResult};
pub use ledger::{Ledger, ReceiveOutcome};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::client::ClientRepository;
pub use repository::product::ProductRepository;
pub use repository::purchase_order::PurchaseOrderRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
pub use repository::settings::SettingsRepository;
pub use repository::supplier::SupplierRepository;
