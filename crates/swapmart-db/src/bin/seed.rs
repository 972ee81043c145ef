//! # Seed Data Generator
//!
//! Populates the database with users, categories and items for development.
//!
//! ## Usage
//! ```bash
//! # 200 items (default)
//! cargo run -p swapmart-db --bin seed
//!
//! # Custom amount
//! cargo run -p swapmart-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p swapmart-db --bin seed -- --db ./data/swapmart.db
//! ```
//!
//! Items are spread round-robin over the seeded users so that every user
//! has something to offer in a swap.

use std::env;

use swapmart_core::{NewItem, NewUser};
use swapmart_db::{Database, DbConfig};

/// Categories with sample item names.
const CATALOG: &[(&str, &[&str])] = &[
    (
        "ELECTRONICS",
        &[
            "Headphones",
            "Bluetooth Speaker",
            "E-Reader",
            "Film Camera",
            "Game Console",
            "Mechanical Keyboard",
        ],
    ),
    (
        "BOOKS",
        &[
            "Cookbook",
            "Poetry Anthology",
            "Graphic Novel",
            "Travel Guide",
            "Atlas",
            "Field Guide to Birds",
        ],
    ),
    (
        "HOME",
        &[
            "Table Lamp",
            "Wool Rug",
            "Cast Iron Pan",
            "Ceramic Vase",
            "Wall Clock",
            "Espresso Maker",
        ],
    ),
    (
        "SPORTS",
        &[
            "Road Bike",
            "Tennis Racket",
            "Yoga Mat",
            "Climbing Shoes",
            "Camping Stove",
            "Skateboard",
        ],
    ),
    (
        "FASHION",
        &[
            "Denim Jacket",
            "Leather Boots",
            "Wool Scarf",
            "Sunglasses",
            "Canvas Backpack",
            "Wristwatch",
        ],
    ),
];

const USERS: &[(&str, &str)] = &[
    ("Ada Obi", "ada"),
    ("Bayo Kell", "bayo"),
    ("Chen Li", "chen"),
    ("Dara Voss", "dara"),
    ("Emeka Hart", "emeka"),
    ("Farah Noor", "farah"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./swapmart_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Swapmart Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./swapmart_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Swapmart Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (category, _) in CATALOG {
        match db.categories().create(category).await {
            Ok(_) => {}
            Err(e) if e.is_unique_violation() => {}
            Err(e) => return Err(e.into()),
        }
    }
    println!("✓ {} categories ready", CATALOG.len());

    let mut users = Vec::with_capacity(USERS.len());
    for (idx, (name, handle)) in USERS.iter().enumerate() {
        let user = db
            .users()
            .insert(&NewUser {
                name: name.to_string(),
                user_name: handle.to_string(),
                email: format!("{handle}@swapmart.dev"),
                phone_number: format!("+1555010{idx:02}"),
                gender: None,
                location: Some("Lagos".to_string()),
            })
            .await?;
        users.push(user);
    }
    println!("✓ {} users created", users.len());

    println!();
    println!("Generating items...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    'outer: for round in 0.. {
        let before = generated;
        for (category_idx, (category, names)) in CATALOG.iter().enumerate() {
            for (name_idx, name) in names.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = round * 100 + category_idx * 10 + name_idx;
                let owner = &users[generated % users.len()];
                let new_item = NewItem {
                    name: if round == 0 {
                        name.to_string()
                    } else {
                        format!("{} #{}", name, round + 1)
                    },
                    description: Some(format!("Pre-loved {}", name.to_lowercase())),
                    category: category.to_string(),
                    price_cents: price_for(seed),
                    owner_id: owner.id.clone(),
                };

                if let Err(e) = db.items().register(&new_item).await {
                    eprintln!("Failed to insert {}: {}", new_item.name, e);
                    continue;
                }

                generated += 1;
                if generated % 100 == 0 {
                    println!("  Generated {} items...", generated);
                }
            }
        }
        if generated == before {
            break;
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} items in {:?}", generated, elapsed);

    let counts = db.table_counts().await?;
    println!();
    println!("Table counts: {:?}", counts);
    println!("✓ Seed complete!");

    Ok(())
}

/// Multiples of $5.00 between $5.00 and $250.00. Prices repeat often enough
/// that equal-value swaps are easy to find.
fn price_for(seed: usize) -> i64 {
    let steps = (seed * 37) % 50;
    500 + steps as i64 * 500
}
