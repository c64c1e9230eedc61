//! SQLite entity store (embedded, no external dependencies)

use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use socialswap_core::ports::{AccountStore, CatalogStore, ListingStore, MessageStore, WatchlistStore};
use socialswap_core::{
    Account, AccountId, Category, CategoryId, Constraint, Listing, ListingId, Message,
    MessageId, NewAccount, NewCategory, NewListing, NewMessage, NewPlatform, Platform,
    PlatformId, Result, StoreError, WatchEntry,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

const ACCOUNT_COLUMNS: &str =
    "id, username, password_hash, email, full_name, avatar_url, created_at";
const LISTING_COLUMNS: &str = "id, title, description, followers, engagement, price, \
     cover_image_url, age, weekly_posts, is_featured, is_hot, owner_id, platform_id, \
     category_id, created_at";
const WATCH_COLUMNS: &str = "id, account_id, listing_id, created_at";
const MESSAGE_COLUMNS: &str =
    "id, subject, content, from_account_id, to_account_id, listing_id, read, created_at";

fn storage(err: sqlx::Error) -> StoreError {
    StoreError::Storage(err.to_string())
}

/// Translate a unique-index failure into the constraint it guards.
/// SQLite names the offending columns in the message, e.g.
/// "UNIQUE constraint failed: accounts.email".
fn insert_error(err: sqlx::Error, constraints: &[(&str, Constraint)]) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if let Some((_, constraint)) = constraints
                .iter()
                .find(|(column, _)| message.contains(column))
            {
                return StoreError::ConstraintViolation(*constraint);
            }
        }
    }
    storage(err)
}

/// Take the row of an `INSERT ... RETURNING`. The statement is run with
/// `fetch_all` so it steps to completion; SQLite commits the implicit
/// transaction only then, and other pooled connections see the row.
fn single<T>(rows: Vec<T>) -> Result<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::Storage("insert returned no row".to_string()))
}

pub struct Database {
    pool: Arc<SqlitePool>,
}

impl Database {
    pub async fn new(database_path: &str) -> AnyResult<Self> {
        tracing::info!("Opening SQLite database at: {}", database_path);

        // Create parent directory if needed
        if let Some(parent) = std::path::Path::new(database_path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .with_context(|| {
                format!("Failed to connect to SQLite database at: {}", database_path)
            })?;

        Self::with_pool(pool).await
    }

    /// Private in-memory database. A single connection that is never
    /// recycled, since each SQLite memory connection is its own database.
    pub async fn in_memory() -> AnyResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory SQLite database")?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> AnyResult<Self> {
        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> AnyResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL COLLATE NOCASE UNIQUE,
                password_hash TEXT NOT NULL,
                email TEXT NOT NULL COLLATE NOCASE UNIQUE,
                full_name TEXT,
                avatar_url TEXT,
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS platforms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL COLLATE NOCASE UNIQUE,
                icon_class TEXT NOT NULL,
                icon_color TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL COLLATE NOCASE UNIQUE
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS listings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                followers INTEGER NOT NULL CHECK (followers >= 0),
                engagement REAL NOT NULL,
                price INTEGER NOT NULL CHECK (price >= 0),
                cover_image_url TEXT,
                age TEXT NOT NULL,
                weekly_posts TEXT NOT NULL,
                is_featured BOOLEAN NOT NULL DEFAULT 0,
                is_hot BOOLEAN NOT NULL DEFAULT 0,
                owner_id INTEGER NOT NULL REFERENCES accounts(id),
                platform_id INTEGER NOT NULL REFERENCES platforms(id),
                category_id INTEGER NOT NULL REFERENCES categories(id),
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS watchlist (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL REFERENCES accounts(id),
                listing_id INTEGER NOT NULL REFERENCES listings(id),
                created_at DATETIME NOT NULL,
                UNIQUE (account_id, listing_id)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                subject TEXT NOT NULL,
                content TEXT NOT NULL,
                from_account_id INTEGER NOT NULL REFERENCES accounts(id),
                to_account_id INTEGER NOT NULL REFERENCES accounts(id),
                listing_id INTEGER NOT NULL REFERENCES listings(id),
                read BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_listings_owner ON listings(owner_id)")
            .execute(pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_parties ON messages(from_account_id, to_account_id)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn fetch_listings(&self, filter: &str, bind: Option<i64>) -> Result<Vec<Listing>> {
        let sql = format!(
            "SELECT {} FROM listings {} ORDER BY id",
            LISTING_COLUMNS, filter
        );
        let mut query = sqlx::query_as::<Sqlite, ListingRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&*self.pool).await.map_err(storage)?;
        Ok(rows.into_iter().map(Listing::from).collect())
    }
}

#[async_trait]
impl AccountStore for Database {
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE id = ?1", ACCOUNT_COLUMNS);
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE username = ?1", ACCOUNT_COLUMNS);
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let sql = format!("SELECT {} FROM accounts WHERE email = ?1", ACCOUNT_COLUMNS);
        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        let sql = format!("SELECT {} FROM accounts ORDER BY id", ACCOUNT_COLUMNS);
        let rows: Vec<AccountRow> = sqlx::query_as(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_account(&self, new: NewAccount) -> Result<Account> {
        let sql = format!(
            r#"
            INSERT INTO accounts (username, password_hash, email, full_name, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        );
        let rows: Vec<AccountRow> = sqlx::query_as(&sql)
            .bind(&new.username)
            .bind(&new.password_hash)
            .bind(&new.email)
            .bind(&new.full_name)
            .bind(Utc::now())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| {
                insert_error(
                    e,
                    &[
                        ("accounts.username", Constraint::Username),
                        ("accounts.email", Constraint::Email),
                    ],
                )
            })?;
        Ok(single(rows)?.into())
    }
}

#[async_trait]
impl CatalogStore for Database {
    async fn get_platform(&self, id: PlatformId) -> Result<Option<Platform>> {
        let row: Option<PlatformRow> = sqlx::query_as(
            "SELECT id, name, icon_class, icon_color FROM platforms WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await
        .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn get_platform_by_name(&self, name: &str) -> Result<Option<Platform>> {
        let row: Option<PlatformRow> = sqlx::query_as(
            "SELECT id, name, icon_class, icon_color FROM platforms WHERE name = ?1",
        )
        .bind(name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn list_platforms(&self) -> Result<Vec<Platform>> {
        let rows: Vec<PlatformRow> =
            sqlx::query_as("SELECT id, name, icon_class, icon_color FROM platforms ORDER BY id")
                .fetch_all(&*self.pool)
                .await
                .map_err(storage)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_platform(&self, new: NewPlatform) -> Result<Platform> {
        let rows: Vec<PlatformRow> = sqlx::query_as(
            r#"
            INSERT INTO platforms (name, icon_class, icon_color)
            VALUES (?1, ?2, ?3)
            RETURNING id, name, icon_class, icon_color
            "#,
        )
        .bind(&new.name)
        .bind(&new.icon_class)
        .bind(&new.icon_color)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| insert_error(e, &[("platforms.name", Constraint::PlatformName)]))?;
        Ok(single(rows)?.into())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, name FROM categories WHERE id = ?1")
                .bind(id)
                .fetch_optional(&*self.pool)
                .await
                .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row: Option<CategoryRow> =
            sqlx::query_as("SELECT id, name FROM categories WHERE name = ?1")
                .bind(name)
                .fetch_optional(&*self.pool)
                .await
                .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_category(&self, new: NewCategory) -> Result<Category> {
        let rows: Vec<CategoryRow> =
            sqlx::query_as("INSERT INTO categories (name) VALUES (?1) RETURNING id, name")
                .bind(&new.name)
                .fetch_all(&*self.pool)
                .await
                .map_err(|e| insert_error(e, &[("categories.name", Constraint::CategoryName)]))?;
        Ok(single(rows)?.into())
    }
}

#[async_trait]
impl ListingStore for Database {
    async fn get_listing(&self, id: ListingId) -> Result<Option<Listing>> {
        let sql = format!("SELECT {} FROM listings WHERE id = ?1", LISTING_COLUMNS);
        let row: Option<ListingRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn list_listings(&self) -> Result<Vec<Listing>> {
        self.fetch_listings("", None).await
    }

    async fn list_featured_listings(&self) -> Result<Vec<Listing>> {
        self.fetch_listings("WHERE is_featured = 1", None).await
    }

    async fn list_hot_listings(&self) -> Result<Vec<Listing>> {
        self.fetch_listings("WHERE is_hot = 1", None).await
    }

    async fn list_listings_by_platform(&self, platform_id: PlatformId) -> Result<Vec<Listing>> {
        self.fetch_listings("WHERE platform_id = ?1", Some(platform_id))
            .await
    }

    async fn list_listings_by_category(&self, category_id: CategoryId) -> Result<Vec<Listing>> {
        self.fetch_listings("WHERE category_id = ?1", Some(category_id))
            .await
    }

    async fn list_listings_by_owner(&self, owner_id: AccountId) -> Result<Vec<Listing>> {
        self.fetch_listings("WHERE owner_id = ?1", Some(owner_id))
            .await
    }

    async fn insert_listing(&self, new: NewListing) -> Result<Listing> {
        let sql = format!(
            r#"
            INSERT INTO listings (title, description, followers, engagement, price,
                                  cover_image_url, age, weekly_posts, is_featured, is_hot,
                                  owner_id, platform_id, category_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            RETURNING {}
            "#,
            LISTING_COLUMNS
        );
        let rows: Vec<ListingRow> = sqlx::query_as(&sql)
            .bind(&new.title)
            .bind(&new.description)
            .bind(new.followers)
            .bind(new.engagement)
            .bind(new.price)
            .bind(&new.cover_image_url)
            .bind(&new.age)
            .bind(&new.weekly_posts)
            .bind(new.is_featured)
            .bind(new.is_hot)
            .bind(new.owner_id)
            .bind(new.platform_id)
            .bind(new.category_id)
            .bind(Utc::now())
            .fetch_all(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(single(rows)?.into())
    }
}

#[async_trait]
impl WatchlistStore for Database {
    async fn get_watch_entry(
        &self,
        account_id: AccountId,
        listing_id: ListingId,
    ) -> Result<Option<WatchEntry>> {
        let sql = format!(
            "SELECT {} FROM watchlist WHERE account_id = ?1 AND listing_id = ?2",
            WATCH_COLUMNS
        );
        let row: Option<WatchRow> = sqlx::query_as(&sql)
            .bind(account_id)
            .bind(listing_id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn list_watch_entries(&self, account_id: AccountId) -> Result<Vec<WatchEntry>> {
        let sql = format!(
            "SELECT {} FROM watchlist WHERE account_id = ?1 ORDER BY id",
            WATCH_COLUMNS
        );
        let rows: Vec<WatchRow> = sqlx::query_as(&sql)
            .bind(account_id)
            .fetch_all(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_watch_entry(
        &self,
        account_id: AccountId,
        listing_id: ListingId,
    ) -> Result<WatchEntry> {
        let sql = format!(
            r#"
            INSERT INTO watchlist (account_id, listing_id, created_at)
            VALUES (?1, ?2, ?3)
            RETURNING {}
            "#,
            WATCH_COLUMNS
        );
        let rows: Vec<WatchRow> = sqlx::query_as(&sql)
            .bind(account_id)
            .bind(listing_id)
            .bind(Utc::now())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| insert_error(e, &[("watchlist.account_id", Constraint::WatchlistPair)]))?;
        Ok(single(rows)?.into())
    }

    async fn delete_watch_entry(
        &self,
        account_id: AccountId,
        listing_id: ListingId,
    ) -> Result<bool> {
        let result = sqlx::query("DELETE FROM watchlist WHERE account_id = ?1 AND listing_id = ?2")
            .bind(account_id)
            .bind(listing_id)
            .execute(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MessageStore for Database {
    async fn get_message(&self, id: MessageId) -> Result<Option<Message>> {
        let sql = format!("SELECT {} FROM messages WHERE id = ?1", MESSAGE_COLUMNS);
        let row: Option<MessageRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(row.map(Into::into))
    }

    async fn list_messages_involving(&self, account_id: AccountId) -> Result<Vec<Message>> {
        let sql = format!(
            r#"
            SELECT {} FROM messages
            WHERE from_account_id = ?1 OR to_account_id = ?1
            ORDER BY id
            "#,
            MESSAGE_COLUMNS
        );
        let rows: Vec<MessageRow> = sqlx::query_as(&sql)
            .bind(account_id)
            .fetch_all(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_message(&self, new: NewMessage) -> Result<Message> {
        let sql = format!(
            r#"
            INSERT INTO messages (subject, content, from_account_id, to_account_id,
                                  listing_id, read, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        );
        let rows: Vec<MessageRow> = sqlx::query_as(&sql)
            .bind(&new.subject)
            .bind(&new.content)
            .bind(new.from_account_id)
            .bind(new.to_account_id)
            .bind(new.listing_id)
            .bind(Utc::now())
            .fetch_all(&*self.pool)
            .await
            .map_err(storage)?;
        Ok(single(rows)?.into())
    }
}

// Helper structs for sqlx query_as
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    username: String,
    password_hash: String,
    email: String,
    full_name: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
    fn from(r: AccountRow) -> Self {
        Account {
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            email: r.email,
            full_name: r.full_name,
            avatar_url: r.avatar_url,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PlatformRow {
    id: i64,
    name: String,
    icon_class: String,
    icon_color: String,
}

impl From<PlatformRow> for Platform {
    fn from(r: PlatformRow) -> Self {
        Platform {
            id: r.id,
            name: r.name,
            icon_class: r.icon_class,
            icon_color: r.icon_color,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(r: CategoryRow) -> Self {
        Category {
            id: r.id,
            name: r.name,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: i64,
    title: String,
    description: String,
    followers: i64,
    engagement: f64,
    price: i64,
    cover_image_url: Option<String>,
    age: String,
    weekly_posts: String,
    is_featured: bool,
    is_hot: bool,
    owner_id: i64,
    platform_id: i64,
    category_id: i64,
    created_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(r: ListingRow) -> Self {
        Listing {
            id: r.id,
            title: r.title,
            description: r.description,
            followers: r.followers,
            engagement: r.engagement,
            price: r.price,
            cover_image_url: r.cover_image_url,
            age: r.age,
            weekly_posts: r.weekly_posts,
            is_featured: r.is_featured,
            is_hot: r.is_hot,
            owner_id: r.owner_id,
            platform_id: r.platform_id,
            category_id: r.category_id,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct WatchRow {
    id: i64,
    account_id: i64,
    listing_id: i64,
    created_at: DateTime<Utc>,
}

impl From<WatchRow> for WatchEntry {
    fn from(r: WatchRow) -> Self {
        WatchEntry {
            id: r.id,
            account_id: r.account_id,
            listing_id: r.listing_id,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    subject: String,
    content: String,
    from_account_id: i64,
    to_account_id: i64,
    listing_id: i64,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(r: MessageRow) -> Self {
        Message {
            id: r.id,
            subject: r.subject,
            content: r.content,
            from_account_id: r.from_account_id,
            to_account_id: r.to_account_id,
            listing_id: r.listing_id,
            read: r.read,
            created_at: r.created_at,
        }
    }
}
