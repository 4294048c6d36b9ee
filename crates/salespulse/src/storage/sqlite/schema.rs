//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. Dates are stored as `YYYY-MM-DD` text so months can be
//! derived with `substr`.

/// Name of the table whose changes feed the change bridge.
pub const SALES_TABLE: &str = "sales";

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS sales (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    order_date TEXT NOT NULL,
    product_category TEXT NOT NULL,
    product TEXT NOT NULL,
    gender TEXT NOT NULL,
    payment_method TEXT NOT NULL,
    sales REAL NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 1,
    discount REAL NOT NULL DEFAULT 0,
    profit REAL NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_sales_order_date ON sales(order_date);
CREATE INDEX IF NOT EXISTS idx_sales_category_date ON sales(product_category, order_date);
"#;

pub const INSERT_SALE: &str = r#"
INSERT INTO sales (order_date, product_category, product, gender, payment_method, sales, quantity, discount, profit)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub const SELECT_SAMPLE: &str = r#"
SELECT id, order_date, product_category, product, gender, payment_method, sales, quantity, discount, profit
FROM sales
ORDER BY id
LIMIT ?1
"#;

pub const SELECT_MONTHLY_ALL: &str = r#"
SELECT substr(order_date, 1, 7) || '-01' AS month, SUM(sales)
FROM sales
GROUP BY month
ORDER BY month
"#;

pub const SELECT_MONTHLY_BY_CATEGORY: &str = r#"
SELECT substr(order_date, 1, 7) || '-01' AS month, SUM(sales)
FROM sales
WHERE product_category = ?1
GROUP BY month
ORDER BY month
"#;

pub const SELECT_SUMMARY: &str = r#"
SELECT COUNT(*), COALESCE(SUM(sales), 0), COALESCE(SUM(profit), 0), COALESCE(AVG(discount), 0)
FROM sales
"#;

pub const SELECT_SALES_BY_CATEGORY: &str = r#"
SELECT product_category, SUM(sales)
FROM sales
GROUP BY product_category
ORDER BY product_category
"#;

pub const SELECT_SALES_BY_GENDER: &str = r#"
SELECT gender, SUM(sales)
FROM sales
GROUP BY gender
ORDER BY gender
"#;

pub const SELECT_PAYMENT_METHODS: &str = r#"
SELECT payment_method, CAST(COUNT(*) AS REAL)
FROM sales
GROUP BY payment_method
ORDER BY payment_method
"#;

pub const SELECT_PROFIT_MARGIN: &str = r#"
SELECT product_category, AVG(profit / sales)
FROM sales
WHERE sales != 0
GROUP BY product_category
ORDER BY product_category
"#;

pub const SELECT_CATEGORIES: &str = r#"
SELECT DISTINCT product_category
FROM sales
ORDER BY product_category
"#;

pub const COUNT_SALES: &str = "SELECT COUNT(*) FROM sales";
