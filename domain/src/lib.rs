//! Domain library for the site backend.
//!
//! Holds the entity shapes (users, contact-form submissions, testimonials),
//! the `Storage` port every backend implements, and the error type shared by
//! all of them. The in-memory backend lives under `adapters`; the SQLite
//! backend is a separate crate so database dependencies stay out of here.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Store-assigned record identifier. Always positive.
pub type RecordId = i64;

/// Input data for creating a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// Stored user account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub username: String,
    pub password: String,
}

impl User {
    pub fn from_new(id: RecordId, input: NewUser) -> Self {
        Self {
            id,
            username: input.username,
            password: input.password,
        }
    }
}

/// Input data for a contact-form submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
}

/// Stored contact-form submission. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    /// `None` when the submitter left the field absent or empty.
    pub phone: Option<String>,
    pub message: String,
    /// Assigned by the store at creation.
    pub created_at: SystemTime,
}

impl Contact {
    /// Build the stored record; an empty phone is normalized to `None`.
    pub fn from_new(id: RecordId, created_at: SystemTime, input: NewContact) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            phone: non_empty(input.phone),
            message: input.message,
            created_at,
        }
    }
}

/// Input data for a testimonial.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestimonial {
    pub name: String,
    pub title: String,
    pub company: String,
    pub message: String,
    pub rating: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Stored testimonial. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: RecordId,
    pub name: String,
    pub title: String,
    pub company: String,
    pub message: String,
    pub rating: String,
    pub image_url: Option<String>,
}

impl Testimonial {
    /// Build the stored record; an empty image url is normalized to `None`.
    pub fn from_new(id: RecordId, input: NewTestimonial) -> Self {
        Self {
            id,
            name: input.name,
            title: input.title,
            company: input.company,
            message: input.message,
            rating: input.rating,
            image_url: non_empty(input.image_url),
        }
    }
}

/// Collapse `Some("")` into `None` so "no value" has a single representation.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Time source abstraction to make code testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Storage port shared by every backend.
///
/// Lookups report a missing record as `Ok(None)`; `Err` is reserved for the
/// backend itself failing.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_user(&self, id: RecordId) -> Result<Option<User>, StorageError>;
    /// Exact match on username.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;
    async fn create_contact(&self, contact: NewContact) -> Result<Contact, StorageError>;
    /// All contacts, most recent first. Equal timestamps order by id, highest first.
    async fn get_contacts(&self) -> Result<Vec<Contact>, StorageError>;
    /// All testimonials. Order is backend specific.
    async fn get_testimonials(&self) -> Result<Vec<Testimonial>, StorageError>;
    async fn create_testimonial(
        &self,
        testimonial: NewTestimonial,
    ) -> Result<Testimonial, StorageError>;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Arc<S> {
    async fn get_user(&self, id: RecordId) -> Result<Option<User>, StorageError> {
        (**self).get_user(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        (**self).get_user_by_username(username).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        (**self).create_user(user).await
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact, StorageError> {
        (**self).create_contact(contact).await
    }

    async fn get_contacts(&self) -> Result<Vec<Contact>, StorageError> {
        (**self).get_contacts().await
    }

    async fn get_testimonials(&self) -> Result<Vec<Testimonial>, StorageError> {
        (**self).get_testimonials().await
    }

    async fn create_testimonial(
        &self,
        testimonial: NewTestimonial,
    ) -> Result<Testimonial, StorageError> {
        (**self).create_testimonial(testimonial).await
    }
}

/// The single storage handle a process builds at startup and hands to its consumers.
pub type SharedStorage = Arc<dyn Storage>;

/// Storage errors. Absence is not an error; see `Storage`.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backing medium is unavailable or rejected the operation.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Return a short about/version line for binaries to print.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{}", pkg, ver)
}

pub mod adapters;
pub mod seed;
