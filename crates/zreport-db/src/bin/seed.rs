//! # Seed Data Generator
//!
//! Populates the database with categories, products and one day of orders,
//! then prints the reconciled report for that day.
//!
//! ## Usage
//! ```bash
//! # Generate 200 orders (default)
//! cargo run -p zreport-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p zreport-db --bin seed -- --orders 1000
//!
//! # Specify database path
//! cargo run -p zreport-db --bin seed -- --db ./data/zreport.db
//! ```
//!
//! ## Generated Data
//! - Revenue categories: Drinks, Snacks, Grocery
//! - Excluded categories: Lotto, Bottle Deposit
//! - Orders between 7 AM and 8 PM UTC today, a few with refund lines

use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use std::env;
use tracing_subscriber::EnvFilter;
use zreport_core::filter::ReportFilter;
use zreport_core::report::{CategoryGroup, CurrencyInfo, PaymentLine, ProductLine, SaleDetailsReport, TaxLine, TaxesInfo};
use zreport_core::{Money, Order, OrderLine, OrderState};
use zreport_db::{Database, ReportConfig};

const SESSION_ID: &str = "seed-session";

/// (category, excluded, products with unit price in cents)
const CATEGORIES: &[(&str, bool, &[(&str, i64)])] = &[
    (
        "Drinks",
        false,
        &[("Coca-Cola 12oz", 199), ("Dasani Water", 149), ("Red Bull", 349), ("Iced Tea", 229)],
    ),
    (
        "Snacks",
        false,
        &[("Lays Classic", 249), ("Snickers", 179), ("Pringles", 299)],
    ),
    (
        "Grocery",
        false,
        &[("Bread", 329), ("Eggs Dozen", 449), ("Rice 2lb", 389)],
    ),
    (
        "Lotto",
        true,
        &[("Pick 3", 100), ("Powerball", 200), ("Scratch $5", 500)],
    ),
    ("Bottle Deposit", true, &[("Deposit 5c", 5), ("Deposit 10c", 10)]),
];

struct SeedProduct {
    id: String,
    name: &'static str,
    category: &'static str,
    price_cents: i64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut config = ReportConfig::load_or_default(None);
    config.database.path = "./zreport_dev.db".into();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database.path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Z-Report Filter Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Number of orders to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./zreport_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Z-Report Filter Seed Data Generator");
    println!("======================================");
    println!("Database: {}", config.database.path.display());
    println!("Orders:   {}", count);
    println!();

    let db = Database::new(config.db_config()).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.categories().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} categories", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Categories and products
    let mut products = Vec::new();
    for (name, excluded, items) in CATEGORIES {
        let category = db.categories().create(name).await?;
        if *excluded {
            db.categories().set_excluded(&category.id, true).await?;
        }
        for (product_name, price_cents) in items.iter() {
            let id = db.orders().create_product(product_name, &[category.id.as_str()]).await?;
            products.push(SeedProduct {
                id,
                name: *product_name,
                category: *name,
                price_cents: *price_cents,
            });
        }
    }
    println!("✓ Created {} categories, {} products", CATEGORIES.len(), products.len());

    // Orders
    let start = std::time::Instant::now();
    let midnight = Utc::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or("could not compute midnight")?;

    let mut orders = Vec::with_capacity(count);
    for seed in 0..count {
        let order = generate_order(&products, seed, midnight);
        db.orders().insert_order(&order).await?;
        orders.push(order);
    }

    let elapsed = start.elapsed();
    println!("✓ Generated {} orders in {:?}", count, elapsed);

    // Reconciled report for the seeded session
    let raw = engine_report(&products, &orders);
    let report = db
        .sale_details(&config.report)
        .get_sale_details(raw, &ReportFilter::for_sessions([SESSION_ID]), None)
        .await?;

    println!();
    println!("Revenue:  {:.2} ({} units)", report.products_info.total, report.products_info.qty);
    println!("Payouts & Adjustments: {:.2}", report.excluded_total);
    for op in &report.excluded_ops {
        println!("  {:<16} {:>6} {:>10.2}", op.product_name, op.quantity, op.base_amount);
    }

    if let Some(hourly) = &report.hourly_sales {
        println!();
        println!("Hourly sales ({}):", config.report.default_timezone);
        for hour in hourly {
            println!("  {:>5}  {:>10.2}  {:>4} orders  {:>4} items", hour.hour, hour.total, hour.orders, hour.items);
        }
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates one order with 1-4 lines.
fn generate_order(products: &[SeedProduct], seed: usize, midnight: chrono::DateTime<Utc>) -> Order {
    let hour = 7 + (seed * 7) % 14;
    let minute = (seed * 13) % 60;

    let line_count = 1 + seed % 4;
    let mut lines: Vec<OrderLine> = (0..line_count)
        .map(|n| {
            let product = &products[(seed * 5 + n * 3) % products.len()];
            let qty = 1 + ((seed + n) % 3) as i64;
            OrderLine {
                product_id: product.id.clone(),
                product_name: product.name.to_string(),
                qty: qty as f64,
                price_subtotal: Money::from_cents(product.price_cents * qty),
                category_ids: Vec::new(),
            }
        })
        .collect();

    // Every 17th order returns one unit of its first item.
    if seed % 17 == 0 {
        let first = lines[0].clone();
        let unit = first.price_subtotal.cents() / first.qty as i64;
        lines.push(OrderLine {
            qty: -1.0,
            price_subtotal: Money::from_cents(-unit),
            ..first
        });
    }

    Order {
        id: format!("seed-{:05}", seed),
        config_id: "register-1".to_string(),
        session_id: SESSION_ID.to_string(),
        state: if seed % 23 == 0 { OrderState::Invoiced } else { OrderState::Paid },
        date_order: midnight + Duration::hours(hour as i64) + Duration::minutes(minute as i64),
        lines,
    }
}

/// A stand-in for the report engine: sale details grouped by category name.
fn engine_report(products: &[SeedProduct], orders: &[Order]) -> SaleDetailsReport {
    let category_of: BTreeMap<&str, &str> = products.iter().map(|p| (p.id.as_str(), p.category)).collect();

    let mut groups: BTreeMap<&str, BTreeMap<String, (f64, Money)>> = BTreeMap::new();
    for line in orders.iter().flat_map(|order| &order.lines) {
        let category = category_of.get(line.product_id.as_str()).copied().unwrap_or("Other");
        let entry = groups
            .entry(category)
            .or_default()
            .entry(line.product_name.clone())
            .or_insert((0.0, Money::zero()));
        entry.0 += line.qty;
        entry.1 += line.price_subtotal;
    }

    let products: Vec<CategoryGroup> = groups
        .into_iter()
        .map(|(name, lines)| {
            let products: Vec<ProductLine> = lines
                .into_iter()
                .map(|(product_name, (quantity, amount))| ProductLine {
                    product_name,
                    quantity,
                    base_amount: amount.to_major(),
                    ..Default::default()
                })
                .collect();
            CategoryGroup {
                name: name.to_string(),
                total: products.iter().fold(0.0, |acc, line| acc + line.base_amount),
                qty: products.iter().fold(0.0, |acc, line| acc + line.quantity),
                products,
                ..Default::default()
            }
        })
        .collect();

    let mut report = SaleDetailsReport {
        products,
        ..Default::default()
    };
    let total = report.products_base_total();
    report.products_info.total = total;
    report.products_info.qty = report.products_quantity();
    report.taxes = vec![TaxLine {
        name: zreport_core::NO_TAX_LABEL.to_string(),
        tax_amount: 0.0,
        base_amount: total,
        ..Default::default()
    }];
    report.taxes_info = TaxesInfo {
        tax_amount: 0.0,
        base_amount: total,
        ..Default::default()
    };
    report.currency = Some(CurrencyInfo {
        total_paid: total,
        ..Default::default()
    });
    report.payments = vec![PaymentLine {
        name: "Cash".to_string(),
        total,
        final_count: Some(total),
        cash: true,
        ..Default::default()
    }];
    report
}
