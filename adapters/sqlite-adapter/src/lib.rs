//! sqlite-adapter — SQLite implementation of the `Storage` port.
//!
//! Purpose
//! - Persist users, contact submissions and testimonials in a single SQLite file.
//! - Implements the `Storage` trait from the `domain` crate with the same
//!   observable behavior as the in-memory store (id assignment, contact
//!   ordering, empty-value normalization).
//!
//! Notes
//! - Uses `rusqlite` with the `bundled` feature for portability.
//! - Every operation is a single statement; creates use `INSERT ... RETURNING`.
//! - Stores `contacts.created_at` as microseconds since UNIX_EPOCH (i64).
//! - No seeding: a fresh database starts with empty tables.
//! - `rusqlite` is synchronous. Each async method runs its one statement inline
//!   on the calling task while holding the connection mutex, so it briefly
//!   blocks that runtime worker. No guard is held across an `.await`.
//! - The parent directory of the database file must already exist.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use domain::{
    non_empty, Clock, Contact, NewContact, NewTestimonial, NewUser, RecordId, Storage,
    StorageError, SystemClock, Testimonial, User,
};
use rusqlite::{params, Connection};
use tracing::{debug, info};

const USER_COLUMNS: &str = "id, username, password";
const CONTACT_COLUMNS: &str = "id, name, email, phone, message, created_at";
const TESTIMONIAL_COLUMNS: &str = "id, name, title, company, message, rating, image_url";

/// SQLite-backed storage.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl SqliteStorage {
    /// Open (or create) a SQLite database at the given path and ensure schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::with_clock(path, Arc::new(SystemClock))
    }

    /// Like `open`, but contact timestamps come from `clock`.
    pub fn with_clock<P: AsRef<Path>>(path: P, clock: Arc<dyn Clock>) -> Result<Self, StorageError> {
        let conn = Connection::open(path.as_ref()).map_err(map_sqerr)?;
        init_schema(&conn)?;
        info!(path = %path.as_ref().display(), "sqlite storage ready");
        Ok(Self { conn: Mutex::new(conn), clock })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Backend("mutex poisoned".into()))
    }
}

fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            message TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_contacts_created_at ON contacts(created_at);
        CREATE TABLE IF NOT EXISTS testimonials (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            title TEXT NOT NULL,
            company TEXT NOT NULL,
            message TEXT NOT NULL,
            rating TEXT NOT NULL,
            image_url TEXT
        );
        "#
    ).map_err(map_sqerr)?;
    Ok(())
}

fn map_sqerr<E: std::fmt::Display>(e: E) -> StorageError { StorageError::Backend(format!("sqlite error: {e}")) }

fn system_time_to_micros(t: SystemTime) -> i64 { t.duration_since(UNIX_EPOCH).unwrap_or(Duration::from_secs(0)).as_micros() as i64 }
fn micros_to_system_time(micros: i64) -> SystemTime { UNIX_EPOCH + Duration::from_micros(micros.max(0) as u64) }

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}

fn row_to_contact(row: &rusqlite::Row) -> rusqlite::Result<Contact> {
    let created_at: i64 = row.get(5)?;
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        message: row.get(4)?,
        created_at: micros_to_system_time(created_at),
    })
}

fn row_to_testimonial(row: &rusqlite::Row) -> rusqlite::Result<Testimonial> {
    Ok(Testimonial {
        id: row.get(0)?,
        name: row.get(1)?,
        title: row.get(2)?,
        company: row.get(3)?,
        message: row.get(4)?,
        rating: row.get(5)?,
        image_url: row.get(6)?,
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get_user(&self, id: RecordId) -> Result<Option<User>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1")).map_err(map_sqerr)?;
        let mut rows = stmt.query(params![id]).map_err(map_sqerr)?;
        if let Some(row) = rows.next().map_err(map_sqerr)? {
            Ok(Some(row_to_user(row).map_err(map_sqerr)?))
        } else {
            Ok(None)
        }
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1 ORDER BY id LIMIT 1")).map_err(map_sqerr)?;
        let mut rows = stmt.query(params![username]).map_err(map_sqerr)?;
        if let Some(row) = rows.next().map_err(map_sqerr)? {
            Ok(Some(row_to_user(row).map_err(map_sqerr)?))
        } else {
            Ok(None)
        }
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let conn = self.conn()?;
        let user = conn.query_row(
            &format!("INSERT INTO users(username, password) VALUES (?1, ?2) RETURNING {USER_COLUMNS}"),
            params![user.username, user.password],
            row_to_user,
        ).map_err(map_sqerr)?;
        debug!(id = user.id, "user created");
        Ok(user)
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact, StorageError> {
        let created_at = system_time_to_micros(self.clock.now());
        let conn = self.conn()?;
        let contact = conn.query_row(
            &format!("INSERT INTO contacts(name, email, phone, message, created_at) VALUES (?1, ?2, ?3, ?4, ?5) RETURNING {CONTACT_COLUMNS}"),
            params![contact.name, contact.email, non_empty(contact.phone), contact.message, created_at],
            row_to_contact,
        ).map_err(map_sqerr)?;
        debug!(id = contact.id, "contact created");
        Ok(contact)
    }

    async fn get_contacts(&self) -> Result<Vec<Contact>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY created_at ASC, id ASC")).map_err(map_sqerr)?;
        let mut out = stmt
            .query_map([], row_to_contact)
            .map_err(map_sqerr)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_sqerr)?;
        // Most recent first
        out.reverse();
        Ok(out)
    }

    async fn get_testimonials(&self) -> Result<Vec<Testimonial>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {TESTIMONIAL_COLUMNS} FROM testimonials")).map_err(map_sqerr)?;
        let out = stmt
            .query_map([], row_to_testimonial)
            .map_err(map_sqerr)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(map_sqerr)?;
        Ok(out)
    }

    async fn create_testimonial(&self, testimonial: NewTestimonial) -> Result<Testimonial, StorageError> {
        let conn = self.conn()?;
        let testimonial = conn.query_row(
            &format!("INSERT INTO testimonials(name, title, company, message, rating, image_url) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {TESTIMONIAL_COLUMNS}"),
            params![
                testimonial.name,
                testimonial.title,
                testimonial.company,
                testimonial.message,
                testimonial.rating,
                non_empty(testimonial.image_url),
            ],
            row_to_testimonial,
        ).map_err(map_sqerr)?;
        debug!(id = testimonial.id, "testimonial created");
        Ok(testimonial)
    }
}
