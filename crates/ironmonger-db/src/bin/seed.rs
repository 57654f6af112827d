//! # Seed Data Generator
//!
//! Populates a store with a hardware catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by IRONMONGER_DB_PATH (or ./ironmonger.db)
//! cargo run -p ironmonger-db --bin seed
//!
//! # Specify database path
//! cargo run -p ironmonger-db --bin seed -- --db ./data/ironmonger.db
//!
//! # Also record a few ledger operations (order, reception, sales)
//! cargo run -p ironmonger-db --bin seed -- --with-activity
//! ```
//!
//! ## Generated Data
//! - Default company settings (only keys that are missing or blank)
//! - Three suppliers, two clients
//! - Products across categories, SKUs derived from the names
//!   (`MAR-0001`), selling price = purchase price + 35 %

use std::env;

use ironmonger_core::money::suggest_selling_price;
use ironmonger_core::{
    ClientKind, MarkupRate, Money, NewClient, NewProduct, NewSupplier, OrderCart, Quantity,
    SaleCart, SaleStatus, CREDIT_PAYMENT_METHOD,
};
use ironmonger_db::{Database, StoreConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (category, unit, [(name, purchase price in cents, opening stock)])
const CATALOG: &[(&str, &str, &[(&str, i64, i64)])] = &[
    (
        "Hand tools",
        "piece",
        &[
            ("Marteau de charpentier 500g", 1_850_000, 12),
            ("Tournevis cruciforme PH2", 320_000, 40),
            ("Pince universelle 180mm", 950_000, 15),
            ("Scie égoïne 500mm", 1_400_000, 6),
            ("Mètre ruban 5m", 480_000, 25),
        ],
    ),
    (
        "Fasteners",
        "kg",
        &[
            ("Pointes tête plate 70mm", 600_000, 50),
            ("Vis à bois 4x40", 1_100_000, 20),
            ("Boulons M10", 1_500_000, 8),
        ],
    ),
    (
        "Building",
        "bag",
        &[
            ("Ciment CEM II 50kg", 3_600_000, 80),
            ("Chaux hydraulique 25kg", 1_900_000, 3),
        ],
    ),
    (
        "Plumbing",
        "m",
        &[
            ("Tube PVC 32mm", 250_000, 120),
            ("Tuyau d'arrosage 19mm", 420_000, 0),
        ],
    ),
    (
        "Electrical",
        "m",
        &[
            ("Câble rigide 2.5mm²", 180_000, 300),
            ("Gaine ICTA 20mm", 90_000, 5),
        ],
    ),
];

const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("Brico Import", "Hery", "+261 34 00 000 01"),
    ("Ciments du Sud", "Lala", "+261 34 00 000 02"),
    ("Electro Distribution", "Tojo", "+261 34 00 000 03"),
];

const MARKUP: MarkupRate = MarkupRate::from_bps(3_500);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = StoreConfig::load()?;
    let mut with_activity = false;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--with-activity" | "-a" => with_activity = true,
            "--help" | "-h" => {
                println!("Ironmonger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>        Database file path (default: ./ironmonger.db)");
                println!("  -a, --with-activity    Record a sample order, reception and sales");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    println!("Ironmonger Seed Data Generator");
    println!("==============================");
    println!("Database: {}", config.database_path.display());
    println!();

    let db = Database::open(&config).await?;
    println!("✓ Connected to database, migrations applied");

    let filled = db.settings().seed_defaults().await?;
    println!("✓ {} default settings written", filled);

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping catalog to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut supplier_ids = Vec::with_capacity(SUPPLIERS.len());
    for (name, contact, phone) in SUPPLIERS {
        let supplier = db
            .suppliers()
            .create(&NewSupplier {
                name: name.to_string(),
                contact_person: Some(contact.to_string()),
                phone: Some(phone.to_string()),
                ..Default::default()
            })
            .await?;
        supplier_ids.push(supplier.id);
    }
    println!("✓ {} suppliers", supplier_ids.len());

    let individual = db
        .clients()
        .create(&NewClient {
            name: "Rasoa Jeanne".to_string(),
            phone: Some("+261 33 00 000 10".to_string()),
            ..Default::default()
        })
        .await?;
    db.clients()
        .create(&NewClient {
            name: "Bâtir Ensemble SARL".to_string(),
            kind: ClientKind::Business,
            tax_id: Some("4000123456".to_string()),
            stat_number: Some("46101 11 2020 0 00123".to_string()),
            ..Default::default()
        })
        .await?;
    println!("✓ 2 clients");

    let mut generated = 0usize;
    for (index, (category, unit, items)) in CATALOG.iter().enumerate() {
        let supplier_id = supplier_ids.get(index % supplier_ids.len()).cloned();
        for (name, purchase_cents, stock) in items.iter() {
            let purchase_price = Money::from_cents(*purchase_cents);
            let input = NewProduct {
                sku: None,
                name: name.to_string(),
                category: Some(category.to_string()),
                unit: Some(unit.to_string()),
                purchase_price,
                selling_price: suggest_selling_price(purchase_price, MARKUP)
                    .unwrap_or(purchase_price),
                promo_price: None,
                opening_stock: Quantity::from_units(*stock),
                supplier_id: supplier_id.clone(),
            };

            if let Err(e) = db.products().create(&input).await {
                eprintln!("Failed to insert {}: {}", name, e);
                continue;
            }
            generated += 1;
        }
    }
    println!("✓ {} products", generated);

    if with_activity {
        seed_activity(&db, &supplier_ids, &individual.id).await?;
    }

    let kpis = db.reports().dashboard_kpis().await?;
    println!();
    println!("Stock valuation: {}", kpis.stock_valuation);
    println!("Low stock:       {} products", db.reports().low_stock().await?.len());
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// One received purchase order, one paid sale and one credit sale.
async fn seed_activity(
    db: &Database,
    supplier_ids: &[String],
    client_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(supplier_id) = supplier_ids.first() else {
        return Ok(());
    };
    let ledger = db.ledger();

    let restock = db.products().list_by_supplier(supplier_id).await?;
    let mut order = OrderCart::new();
    for product in restock.iter().take(3) {
        order.add(product, Quantity::from_units(10))?;
    }
    if !order.is_empty() {
        let request = order.into_purchase_order_request(supplier_id.clone())?;
        let record = ledger.create_purchase_order(&request).await?;
        ledger.receive_purchase_order(&record.order.id).await?;
        println!("✓ Purchase order received ({})", record.order.total_cost());
    }

    let in_stock = db.products().list_in_stock().await?;
    let mut counter = SaleCart::new();
    for product in in_stock.iter().take(2) {
        counter.add(product, Quantity::from_units(2))?;
    }
    if !counter.is_empty() {
        let paid = ledger
            .record_sale(&counter.into_sale_request(None, "Cash", SaleStatus::Paid)?)
            .await?;
        println!("✓ Paid sale ({})", paid.sale.total());
    }

    if let Some(product) = in_stock.last() {
        let mut credit = SaleCart::new();
        credit.add(product, Quantity::from_units(1))?;
        let record = ledger
            .record_sale(&credit.into_sale_request(
                Some(client_id.to_string()),
                CREDIT_PAYMENT_METHOD,
                SaleStatus::Credit,
            )?)
            .await?;
        println!("✓ Credit sale ({})", record.sale.total());
    }

    info!("Sample activity recorded");
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=ironmonger_db=trace` - Trace the database crate only
/// - Default: INFO, DEBUG for the ironmonger crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ironmonger=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
