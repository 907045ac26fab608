//! # Seed Data Generator
//!
//! Populates the store with sample customers, products and orders for local
//! development.
//!
//! ## Usage
//! ```bash
//! # 200 orders (default)
//! cargo run -p ventas-db --bin seed
//!
//! # Custom amount
//! cargo run -p ventas-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p ventas-db --bin seed -- --db ./data/ventas.db
//! ```
//!
//! ## Generated Data
//! - One product per catalog entry, with `equivalencias` codes
//! - One customer per four orders (at least one)
//! - Orders spread over the last 90 days, 1-4 items each, totals computed
//!   the same way the API computes them

use chrono::{Duration, Utc};
use std::env;
use ventas_core::mapper::to_document;
use ventas_core::money::calculate_total;
use ventas_core::types::{
    ClienteDocument, ClienteForm, Equivalencias, OrdenDocument, OrdenItem, PreferenciaValor,
    Preferencias, ProductoDocument, ProductoForm,
};
use ventas_core::{DocumentId, GENEROS};
use ventas_db::{Database, DbConfig, DocumentCollection, Filter, CLIENTES, ORDENES, PRODUCTOS};

/// (categoria, nombre, precio)
const CATALOG: &[(&str, &str, f64)] = &[
    ("Bebidas", "Café molido 500g", 4.75),
    ("Bebidas", "Té verde 20 sobres", 2.10),
    ("Bebidas", "Jugo de naranja 1L", 1.95),
    ("Panadería", "Pan baguette", 1.20),
    ("Panadería", "Croissant", 0.95),
    ("Lácteos", "Leche entera 1L", 1.05),
    ("Lácteos", "Queso turrialba 400g", 5.40),
    ("Abarrotes", "Arroz 2kg", 2.85),
    ("Abarrotes", "Frijoles negros 1kg", 2.30),
    ("Limpieza", "Detergente 1kg", 3.60),
];

const NOMBRES: &[&str] = &[
    "Ana Solís",
    "Carlos Mora",
    "María Jiménez",
    "José Vargas",
    "Lucía Rojas",
    "Diego Castro",
];

const PAISES: &[&str] = &["Costa Rica", "Panamá", "Nicaragua", "México"];

const CANALES: &[&str] = &["WEB", "TIENDA", "APP"];

const DESCUENTOS: &[Option<f64>] = &[None, None, Some(5.0), Some(10.0), Some(0.0)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./ventas_dev.db");

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
                println!("Ventas Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of orders to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./ventas_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Ventas Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let clientes = db.clientes();
    let productos = db.productos();
    let ordenes = db.ordenes();

    let existing = clientes.count(&Filter::All).await?;
    if existing > 0 {
        println!("⚠ Database already has {} clientes", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let now = Utc::now();

    // Products
    let mut producto_ids = Vec::with_capacity(CATALOG.len());
    for (idx, (categoria, nombre, _)) in CATALOG.iter().enumerate() {
        let id = DocumentId::generate();
        let doc = ProductoDocument::new(
            id,
            ProductoForm {
                nombre: nombre.to_string(),
                categoria: categoria.to_string(),
                codigo: format!(
                    "{}-{:03}",
                    categoria.chars().take(3).collect::<String>().to_uppercase(),
                    idx
                ),
                equivalencias: Some(Equivalencias {
                    sku: Some(format!("744{:07}", idx * 7919)),
                    codigo_alt: (idx % 2 == 0).then(|| format!("ALT-{idx}")),
                }),
            },
            now,
        );
        productos.insert_one(id, to_document(PRODUCTOS, &doc)?).await?;
        producto_ids.push(id);
    }
    println!("✓ Inserted {} productos", producto_ids.len());

    // Customers
    let cliente_count = (count / 4).max(1);
    let mut cliente_ids = Vec::with_capacity(cliente_count);
    for seed in 0..cliente_count {
        let id = DocumentId::generate();
        let doc = ClienteDocument::new(id, generate_cliente(seed), now);
        clientes.insert_one(id, to_document(CLIENTES, &doc)?).await?;
        cliente_ids.push(id);
    }
    println!("✓ Inserted {} clientes", cliente_ids.len());

    // Orders
    let mut revenue = 0.0;
    for seed in 0..count {
        let items = generate_items(seed, &producto_ids);
        let total = calculate_total(&items);
        revenue += total;

        let fecha = now
            - Duration::days((seed % 90) as i64)
            - Duration::minutes((seed * 37 % 1440) as i64);
        let id = DocumentId::generate();
        let doc = OrdenDocument {
            id,
            cliente_id: cliente_ids[seed % cliente_ids.len()].to_string(),
            fecha,
            canal: CANALES[seed % CANALES.len()].to_string(),
            moneda: "USD".to_string(),
            items: items
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()?,
            descripcion: (seed % 5 == 0).then(|| format!("Pedido de prueba #{seed}")),
            total: Some(total),
            creado: Some(fecha),
            actualizado: Some(fecha),
        };
        ordenes.insert_one(id, to_document(ORDENES, &doc)?).await?;

        if (seed + 1) % 100 == 0 {
            println!("  Generated {} ordenes...", seed + 1);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} ordenes in {:?}", count, elapsed);
    println!("  Revenue: {:.2}", revenue);

    if let Some(summary) = ordenes.summarize("total").await? {
        println!(
            "  Stats check: count={} avg={:.2} min={:.2} max={:.2}",
            summary.count, summary.avg, summary.min, summary.max
        );
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds a customer with a mix of single and multi-valued preferences.
fn generate_cliente(seed: usize) -> ClienteForm {
    let nombre = NOMBRES[seed % NOMBRES.len()];
    let email = format!(
        "{}.{}@example.com",
        nombre.split_whitespace().next().unwrap_or("cliente").to_lowercase(),
        seed
    );

    let mut preferencias = Preferencias::new();
    preferencias.insert(
        "canal".to_string(),
        PreferenciaValor::Texto(CANALES[seed % CANALES.len()].to_string()),
    );
    if seed % 3 == 0 {
        preferencias.insert(
            "categorias".to_string(),
            PreferenciaValor::Lista(vec!["Bebidas".to_string(), "Panadería".to_string()]),
        );
    }

    ClienteForm {
        nombre: nombre.to_string(),
        email,
        genero: GENEROS[seed % GENEROS.len()].to_string(),
        pais: PAISES[seed % PAISES.len()].to_string(),
        preferencias: Some(preferencias),
    }
}

/// Builds 1-4 line items drawn from the catalog.
fn generate_items(seed: usize, producto_ids: &[DocumentId]) -> Vec<OrdenItem> {
    let lines = 1 + seed % 4;
    (0..lines)
        .map(|line| {
            let idx = (seed * 3 + line * 7) % CATALOG.len();
            let (_, _, precio) = CATALOG[idx];
            OrdenItem::new(
                producto_ids[idx].to_string(),
                1 + ((seed + line) % 5) as i64,
                precio,
                DESCUENTOS[(seed + line) % DESCUENTOS.len()],
            )
        })
        .collect()
}
