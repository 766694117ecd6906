//! Books repository for database operations.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookChanges, BookQuery, NewBook},
};

const BOOK_COLUMNS: &str = "id, name, author, price, tag, document, created_at, updated_at";

/// One independent predicate of a list query.
///
/// Multiple predicates combine with OR: a record matching any one of them
/// is included in the result.
#[derive(Debug, Clone)]
pub enum FilterClause {
    TagContains(String),
    CreatedWithin {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    AuthorIs(String),
    PriceIs(Decimal),
}

/// Criteria for a list query: predicate clauses plus a result cap.
#[derive(Debug, Clone, Default)]
pub struct ListCriteria {
    pub clauses: Vec<FilterClause>,
    pub limit: Option<i64>,
}

impl ListCriteria {
    /// Build criteria from query-string parameters.
    pub fn from_query(query: &BookQuery) -> AppResult<Self> {
        let mut clauses = Vec::new();

        if let Some(ref tag) = query.tag {
            clauses.push(FilterClause::TagContains(tag.clone()));
        }

        if let Some(ref date) = query.date {
            let (start, end) = day_bounds(date)?;
            clauses.push(FilterClause::CreatedWithin { start, end });
        }

        if let Some(ref author) = query.author {
            clauses.push(FilterClause::AuthorIs(author.clone()));
        }

        if let Some(price) = query.price {
            clauses.push(FilterClause::PriceIs(price));
        }

        Ok(Self {
            clauses,
            limit: query.limit,
        })
    }
}

/// Inclusive first/last second of a DD-MM-YYYY calendar day, in UTC.
fn day_bounds(date: &str) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let day = NaiveDate::parse_from_str(date, "%d-%m-%Y")
        .map_err(|_| AppError::Validation(format!("Invalid date filter: {}", date)))?;

    let start = day.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::seconds(86_399);

    Ok((start, end))
}

/// Values bound to the numbered placeholders of a generated query,
/// in placeholder order.
#[derive(Debug)]
enum BindValue {
    Text(String),
    Amount(Decimal),
    Instant(DateTime<Utc>),
}

fn build_find_sql(criteria: &ListCriteria) -> (String, Vec<BindValue>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    for clause in &criteria.clauses {
        match clause {
            FilterClause::TagContains(tag) => {
                binds.push(BindValue::Text(tag.clone()));
                conditions.push(format!("tag LIKE '%' || ${} || '%'", binds.len()));
            }
            FilterClause::CreatedWithin { start, end } => {
                binds.push(BindValue::Instant(*start));
                binds.push(BindValue::Instant(*end));
                conditions.push(format!(
                    "(created_at >= ${} AND created_at <= ${})",
                    binds.len() - 1,
                    binds.len()
                ));
            }
            FilterClause::AuthorIs(author) => {
                binds.push(BindValue::Text(author.clone()));
                conditions.push(format!("author = ${}", binds.len()));
            }
            FilterClause::PriceIs(price) => {
                binds.push(BindValue::Amount(*price));
                conditions.push(format!("price = ${}", binds.len()));
            }
        }
    }

    let mut sql = format!("SELECT {} FROM books", BOOK_COLUMNS);

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" OR "));
    }

    sql.push_str(" ORDER BY created_at DESC");

    if let Some(limit) = criteria.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    (sql, binds)
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List book records matching the criteria, newest first.
    pub async fn find(&self, criteria: &ListCriteria) -> AppResult<Vec<Book>> {
        let (sql, binds) = build_find_sql(criteria);

        let mut query = sqlx::query_as::<_, Book>(&sql);
        for bind in binds {
            query = match bind {
                BindValue::Text(v) => query.bind(v),
                BindValue::Amount(v) => query.bind(v),
                BindValue::Instant(v) => query.bind(v),
            };
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Get a book record by id.
    pub async fn find_one(&self, id: i32) -> AppResult<Option<Book>> {
        let sql = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);

        Ok(sqlx::query_as::<_, Book>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Insert a new book record.
    pub async fn create(&self, book: &NewBook) -> AppResult<Book> {
        let now = Utc::now();

        let sql = format!(
            r#"
            INSERT INTO books (name, author, price, tag, document, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        let created = sqlx::query_as::<_, Book>(&sql)
            .bind(&book.name)
            .bind(&book.author)
            .bind(book.price)
            .bind(&book.tag)
            .bind(book.document.clone().map(Json))
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Apply partial changes to a book record; absent fields keep their
    /// previous values.
    pub async fn update(&self, id: i32, changes: &BookChanges) -> AppResult<Book> {
        let now = Utc::now();

        let sql = format!(
            r#"
            UPDATE books SET
                name = COALESCE($1, name),
                author = COALESCE($2, author),
                price = COALESCE($3, price),
                tag = COALESCE($4, tag),
                document = COALESCE($5, document),
                updated_at = $6
            WHERE id = $7
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        sqlx::query_as::<_, Book>(&sql)
            .bind(&changes.name)
            .bind(&changes.author)
            .bind(changes.price)
            .bind(&changes.tag)
            .bind(changes.document.clone().map(Json))
            .bind(now)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Book record not existing!".to_string()))
    }

    /// Remove a book record.
    pub async fn destroy(&self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
