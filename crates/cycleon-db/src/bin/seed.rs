//! # Seed Data Generator
//!
//! Populates the database with sample locations, bikes and a demo rider.
//!
//! ## Usage
//! ```bash
//! # Seed ./cycleon.db
//! cargo run -p cycleon-db --bin seed
//!
//! # Specify database path
//! cargo run -p cycleon-db --bin seed -- --db ./data/cycleon.db
//! ```

use cycleon_core::Money;
use cycleon_db::{Database, DbConfig};
use std::env;

/// (name, coordinates, bikes as (name, description))
const LOCATIONS: &[(&str, &str, &[(&str, &str)])] = &[
    (
        "Elm Street Station",
        "40.7128,-74.0060",
        &[
            ("Roadster", "Lightweight blue city bike"),
            ("Commuter", "Seven-speed bike with a rear rack"),
            ("Cargo One", "Front-loading cargo bike for groceries"),
        ],
    ),
    (
        "Harbor Point",
        "40.7033,-74.0170",
        &[
            ("Cruiser", "Green beach cruiser with wide tyres"),
            ("Tandem", "Two-seat tandem for riding together"),
        ],
    ),
    (
        "Central Park West",
        "40.7812,-73.9665",
        &[
            ("Climber", "Red mountain bike with front suspension"),
            ("Folding Pro", "Compact folding bike for mixed commutes"),
            ("E-Assist", "Pedal-assist electric bike, 60 km range"),
        ],
    ),
    ("Riverside Depot", "40.8007,-73.9712", &[]),
];

const DEMO_USERNAME: &str = "demo";

/// 50.00 opening balance for the demo rider.
const DEMO_BALANCE_CENTS: i64 = 5_000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./cycleon.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Cycleon Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cycleon.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Cycleon Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.locations().list().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} locations", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Creating locations...");

    let mut bikes_created = 0;
    for (name, coordinates, bikes) in LOCATIONS {
        let location = db.locations().create(name, coordinates).await?;

        for (bike_name, description) in bikes.iter() {
            let bike = db
                .locations()
                .add_new_bike(&location.id, bike_name, description)
                .await?;
            println!("  {} ← {} ({})", location.name, bike.name, bike.id);
            bikes_created += 1;
        }
    }

    let demo = db
        .accounts()
        .create(DEMO_USERNAME, Money::from_cents(DEMO_BALANCE_CENTS))
        .await?;

    println!();
    println!(
        "✓ Created {} locations and {} bikes",
        LOCATIONS.len(),
        bikes_created
    );
    println!("✓ Demo account '{}' ({}), balance {}", demo.username, demo.id, demo.balance());
    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
