//! SQLite repository implementation.
//!
//! Implements `SalesRepository` from `salespulse_core::storage` using SQLite.

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use salespulse_core::notify::ChangeSignal;
use salespulse_core::sales::{
    is_all_categories, validate_category, Aggregate, AggregateQuery, BreakdownRow, MonthlyPoint,
    NewSale, Sale, ALL_CATEGORIES,
};
use salespulse_core::storage::{RepositoryError, Result, SalesRepository};

use super::conversions::{
    format_date, round_breakdown, row_to_breakdown, row_to_monthly_point, row_to_sale,
    row_to_summary,
};
use super::error::{map_tokio_rusqlite_error, wrap_err};
use super::schema;
use crate::bridge::ChangeNotifier;

/// Origin reported by signals raised from the update hook.
const HOOK_ORIGIN: &str = "sqlite_update_hook";

/// SQLite-based sales repository.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Opens (or creates) a file-based database and ensures the schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a repository with an in-memory database.
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(map_tokio_rusqlite_error)
    }

    /// Installs an update hook that raises a change signal for every row
    /// inserted, updated or deleted in the sales table, whoever wrote it
    /// through this connection.
    pub async fn with_change_notifier(self, notifier: ChangeNotifier) -> Result<Self> {
        self.conn
            .call(move |conn| {
                conn.update_hook(Some(
                    move |_action, _db: &str, table: &str, _rowid: i64| {
                        if table == schema::SALES_TABLE {
                            notifier.notify(ChangeSignal::new(HOOK_ORIGIN));
                        }
                    },
                ));
                Ok(())
            })
            .await
            .map_err(map_tokio_rusqlite_error)?;

        Ok(self)
    }

    /// Number of stored sales.
    pub async fn count(&self) -> Result<u64> {
        self.conn
            .call(|conn| {
                let count: i64 = conn
                    .query_row(schema::COUNT_SALES, [], |row| row.get(0))
                    .map_err(wrap_err)?;
                Ok(count.unsigned_abs())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn breakdown(&self, sql: &'static str) -> Result<Vec<BreakdownRow>> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(sql).map_err(wrap_err)?;
                let rows = stmt.query_map([], row_to_breakdown).map_err(wrap_err)?;
                rows.collect::<rusqlite::Result<Vec<_>>>().map_err(wrap_err)
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn categories(&self) -> Result<Vec<String>> {
        let stored = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(schema::SELECT_CATEGORIES).map_err(wrap_err)?;
                let rows = stmt
                    .query_map([], |row| row.get::<_, String>(0))
                    .map_err(wrap_err)?;
                rows.collect::<rusqlite::Result<Vec<_>>>().map_err(wrap_err)
            })
            .await
            .map_err(map_tokio_rusqlite_error)?;

        let mut categories = Vec::with_capacity(stored.len() + 1);
        categories.push(ALL_CATEGORIES.to_string());
        categories.extend(stored);
        Ok(categories)
    }
}

fn validate_new_sale(sale: &NewSale) -> Result<()> {
    validate_category(&sale.product_category)
        .map_err(|e| RepositoryError::InvalidData(format!("product_category: {e}")))?;
    if !sale.sales.is_finite() || !sale.discount.is_finite() || !sale.profit.is_finite() {
        return Err(RepositoryError::InvalidData(
            "sales, discount and profit must be finite".to_string(),
        ));
    }
    if sale.quantity < 0 {
        return Err(RepositoryError::InvalidData(
            "quantity must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl SalesRepository for SqliteRepository {
    async fn monthly_series(&self, category: &str) -> Result<Vec<MonthlyPoint>> {
        let category = (!is_all_categories(category)).then(|| category.to_string());

        self.conn
            .call(move |conn| {
                let points = match &category {
                    Some(category) => {
                        let mut stmt = conn
                            .prepare(schema::SELECT_MONTHLY_BY_CATEGORY)
                            .map_err(wrap_err)?;
                        let rows = stmt
                            .query_map([category], row_to_monthly_point)
                            .map_err(wrap_err)?;
                        rows.collect::<rusqlite::Result<Vec<_>>>()
                    }
                    None => {
                        let mut stmt = conn.prepare(schema::SELECT_MONTHLY_ALL).map_err(wrap_err)?;
                        let rows = stmt.query_map([], row_to_monthly_point).map_err(wrap_err)?;
                        rows.collect::<rusqlite::Result<Vec<_>>>()
                    }
                };
                points.map_err(wrap_err)
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn aggregate(&self, query: AggregateQuery) -> Result<Aggregate> {
        match query {
            AggregateQuery::Summary => {
                let summary = self
                    .conn
                    .call(|conn| {
                        conn.query_row(schema::SELECT_SUMMARY, [], row_to_summary)
                            .map_err(wrap_err)
                    })
                    .await
                    .map_err(map_tokio_rusqlite_error)?;
                summary
                    .map(Aggregate::Summary)
                    .ok_or_else(RepositoryError::no_sales)
            }
            AggregateQuery::SalesByCategory => Ok(Aggregate::Breakdown(round_breakdown(
                self.breakdown(schema::SELECT_SALES_BY_CATEGORY).await?,
            ))),
            AggregateQuery::SalesByGender => Ok(Aggregate::Breakdown(round_breakdown(
                self.breakdown(schema::SELECT_SALES_BY_GENDER).await?,
            ))),
            AggregateQuery::PaymentMethods => Ok(Aggregate::Breakdown(
                self.breakdown(schema::SELECT_PAYMENT_METHODS).await?,
            )),
            AggregateQuery::ProfitMargin => Ok(Aggregate::Breakdown(
                self.breakdown(schema::SELECT_PROFIT_MARGIN).await?,
            )),
            AggregateQuery::Categories => Ok(Aggregate::Categories(self.categories().await?)),
        }
    }

    async fn sample(&self, limit: usize) -> Result<Vec<Sale>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(schema::SELECT_SAMPLE).map_err(wrap_err)?;
                let rows = stmt.query_map([limit], row_to_sale).map_err(wrap_err)?;
                rows.collect::<rusqlite::Result<Vec<_>>>().map_err(wrap_err)
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }

    async fn insert_sales(&self, sales: &[NewSale]) -> Result<usize> {
        if sales.is_empty() {
            return Ok(0);
        }
        for sale in sales {
            validate_new_sale(sale)?;
        }

        let sales = sales.to_vec();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction().map_err(wrap_err)?;
                {
                    let mut stmt = tx.prepare(schema::INSERT_SALE).map_err(wrap_err)?;
                    for sale in &sales {
                        stmt.execute(rusqlite::params![
                            format_date(&sale.order_date),
                            sale.product_category,
                            sale.product,
                            sale.gender,
                            sale.payment_method,
                            sale.sales,
                            sale.quantity,
                            sale.discount,
                            sale.profit,
                        ])
                        .map_err(wrap_err)?;
                    }
                }
                tx.commit().map_err(wrap_err)?;
                Ok(sales.len())
            })
            .await
            .map_err(map_tokio_rusqlite_error)
    }
}
