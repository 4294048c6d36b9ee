use chrono::{Datelike, Local, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use salespulse_core::sales::{round2, NewSale};
use salespulse_core::storage::{RepositoryError, SalesRepository};

use crate::storage::SqliteRepository;

/// Months of history generated for a fresh database.
const DEMO_MONTHS: u32 = 24;
const ORDERS_PER_MONTH: u32 = 40;

/// (category, products, base price)
const CATALOG: &[(&str, &[&str], f64)] = &[
    (
        "Auto & Accessories",
        &["Car Seat Covers", "Tyre Inflator", "Dash Cam"],
        120.0,
    ),
    ("Electronic", &["Headphones", "Smart Watch", "Tablet"], 260.0),
    ("Fashion", &["Sneakers", "Denim Jacket", "Sunglasses"], 70.0),
    (
        "Home & Furniture",
        &["Desk Lamp", "Bookshelf", "Office Chair"],
        180.0,
    ),
];
const GENDERS: &[&str] = &["Female", "Male"];
const PAYMENT_METHODS: &[&str] = &["credit_card", "debit_card", "e_wallet", "money_order"];

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

/// Generates `months` months of orders starting at `start`.
///
/// Monthly volume grows slowly with a yearly swing so forecasts have a
/// visible trend.
pub fn generate_demo_sales(start: NaiveDate, months: u32, rng: &mut StdRng) -> Vec<NewSale> {
    let mut sales = Vec::with_capacity((months * ORDERS_PER_MONTH) as usize);

    for offset in 0..months {
        let Some(month) = start.checked_add_months(Months::new(offset)) else {
            break;
        };
        let growth = 1.0 + 0.02 * offset as f64;
        let season = 1.0 + 0.15 * (month.month0() as f64 * std::f64::consts::PI / 6.0).sin();

        for _ in 0..ORDERS_PER_MONTH {
            let (category, products, base) = CATALOG[rng.random_range(0..CATALOG.len())];
            let day = rng.random_range(1..=28);
            let order_date = month.with_day(day).unwrap_or(month);
            let quantity: i64 = rng.random_range(1..=4);
            let discount = round2(rng.random_range(0.0..0.3));
            let price = base * growth * season * rng.random_range(0.7..1.3);
            let sales_value = round2(price * quantity as f64 * (1.0 - discount));
            let profit = round2(sales_value * rng.random_range(-0.05..0.35));

            sales.push(NewSale {
                order_date,
                product_category: category.to_string(),
                product: pick(rng, products).to_string(),
                gender: pick(rng, GENDERS).to_string(),
                payment_method: pick(rng, PAYMENT_METHODS).to_string(),
                sales: sales_value,
                quantity,
                discount,
                profit,
            });
        }
    }

    sales
}

/// Populates an empty database with demo sales ending this month.
///
/// Returns the number of rows inserted, 0 when the database already holds data.
pub async fn seed_if_empty(database: &SqliteRepository) -> Result<usize, RepositoryError> {
    let existing = database.count().await?;
    if existing > 0 {
        tracing::info!(existing, "Database already has sales, skipping demo data");
        return Ok(0);
    }

    let today = Local::now().date_naive();
    let this_month = today.with_day(1).unwrap_or(today);
    let start = this_month
        .checked_sub_months(Months::new(DEMO_MONTHS - 1))
        .unwrap_or(this_month);

    let mut rng = StdRng::from_os_rng();
    let batch = generate_demo_sales(start, DEMO_MONTHS, &mut rng);
    let inserted = database.insert_sales(&batch).await?;
    tracing::info!(inserted, %start, "Seeded demo sales");
    Ok(inserted)
}
