//! # Seed Data Generator
//!
//! Populates the database with a bilingual sample menu for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./toohot.db
//! cargo run -p toohot-db --bin seed
//!
//! # Specify database path
//! cargo run -p toohot-db --bin seed -- --db ./data/toohot.db
//! ```
//!
//! ## Generated Menu
//! A small Sichuan menu across five categories. Each dish has an English
//! and a Chinese name, a spice level and its allergens. One dish is marked
//! unavailable so the "sold out" path can be exercised locally.

use chrono::Utc;
use std::env;
use toohot_core::MenuItem;
use toohot_db::repository::menu::generate_menu_item_id;
use toohot_db::{Database, DbConfig};

/// Seed row: (category, name_en, name_zh, description_en, price_cents,
/// spice_level, vegetarian, popular, allergens)
type SeedDish = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    i64,
    u8,
    bool,
    bool,
    &'static [&'static str],
);

const DISHES: &[SeedDish] = &[
    ("appetizers", "Cucumber Salad", "拍黄瓜", "Smashed cucumber, garlic, black vinegar", 799, 1, true, false, &["sesame"]),
    ("appetizers", "Wontons in Chili Oil", "红油抄手", "Pork wontons, house chili oil", 1099, 3, false, true, &["wheat", "soy", "sesame"]),
    ("appetizers", "Mouth-Watering Chicken", "口水鸡", "Poached chicken, numbing chili dressing", 1299, 3, false, true, &["peanuts", "sesame"]),
    ("noodles", "Dan Dan Noodles", "担担面", "Minced pork, preserved greens, peanuts", 1399, 2, false, true, &["wheat", "peanuts", "soy"]),
    ("noodles", "Chongqing Noodles", "重庆小面", "Street-style noodles, chili and Sichuan pepper", 1299, 4, true, false, &["wheat", "soy"]),
    ("mains", "Mapo Tofu", "麻婆豆腐", "Silken tofu, fermented broad bean, beef", 1599, 4, false, true, &["soy"]),
    ("mains", "Kung Pao Chicken", "宫保鸡丁", "Chicken, peanuts, dried chilies", 1699, 2, false, true, &["peanuts", "soy"]),
    ("mains", "Chongqing Spicy Chicken", "辣子鸡", "Crispy chicken buried in dried chilies", 1899, 5, false, false, &["soy"]),
    ("mains", "Boiled Fish in Chili Oil", "水煮鱼", "Flounder, napa cabbage, chili oil", 2399, 5, false, false, &["fish", "soy"]),
    ("vegetables", "Dry-Fried Green Beans", "干煸四季豆", "Blistered green beans, preserved vegetables", 1399, 1, true, false, &["soy"]),
    ("vegetables", "Garlic Bok Choy", "蒜蓉小白菜", "Stir-fried baby bok choy", 1199, 0, true, false, &[]),
    ("desserts", "Brown Sugar Rice Cake", "红糖糍粑", "Fried glutinous rice, brown sugar syrup", 899, 0, true, false, &["soy"]),
    ("desserts", "Ice Jelly", "冰粉", "Seasonal, sold out", 699, 0, true, false, &[]),
];

/// Dishes seeded as unavailable.
const SOLD_OUT: &[&str] = &["Ice Jelly"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./toohot.db");

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
                println!("TooHot Menu Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./toohot.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌶  TooHot Menu Seeder");
    println!("=====================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.menu().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} menu items", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut inserted = 0;
    for dish in DISHES {
        let item = build_item(dish);
        if let Err(e) = db.menu().insert(&item).await {
            eprintln!("Failed to insert {}: {}", item.name_en, e);
            continue;
        }
        inserted += 1;
    }

    println!();
    println!("✓ Inserted {} menu items", inserted);
    println!("  Categories: {}", db.menu().categories().await?.join(", "));
    println!("  Available:  {}", db.menu().list_available().await?.len());
    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn build_item(dish: &SeedDish) -> MenuItem {
    let (category, name_en, name_zh, description, price_cents, spice, vegetarian, popular, allergens) =
        *dish;
    let now = Utc::now();

    MenuItem {
        id: generate_menu_item_id(),
        name_en: name_en.to_string(),
        name_zh: name_zh.to_string(),
        description_en: Some(description.to_string()),
        description_zh: None,
        price_cents,
        category: category.to_string(),
        is_vegetarian: vegetarian,
        is_vegan: vegetarian && allergens.is_empty(),
        is_popular: popular,
        spice_level: spice,
        allergens: allergens.iter().map(|a| a.to_string()).collect(),
        is_available: !SOLD_OUT.contains(&name_en),
        image_url: None,
        prep_time_minutes: Some(10 + i64::from(spice) * 2),
        created_at: now,
        updated_at: now,
    }
}
