//! User Feedback
//!
//! Free-text feedback is validated locally and then written to the
//! feedback store. Nothing reaches the store unless validation passes.

pub mod store;


use async_trait::async_trait;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

pub use store::{DatabaseConfig, PgFeedbackStore};

/// One feedback submission, stored exactly as entered
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct FeedbackEntry {
    #[validate(custom(function = "not_blank"))]
    pub name: String,

    /// Stored as NULL when absent or empty
    pub email: Option<String>,

    #[validate(custom(function = "not_blank"))]
    pub feedback: String,
}

impl FeedbackEntry {
    /// Build an entry from raw form input; an empty email becomes `None`
    pub fn new(name: &str, email: Option<&str>, feedback: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.filter(|e| !e.is_empty()).map(str::to_string),
            feedback: feedback.to_string(),
        }
    }
}

/// Required text fields must contain something besides whitespace
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Please fill out all required fields.")]
    MissingFields(#[from] ValidationErrors),

    #[error("Error connecting to the database: {0}")]
    Connection(String),

    #[error("Error saving feedback: {0}")]
    Insert(String),
}

/// Destination for validated feedback
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn insert(&self, entry: &FeedbackEntry) -> Result<(), FeedbackError>;
}

/// Validate `entry` and hand it to `store`
pub async fn submit_feedback<S>(store: &S, entry: &FeedbackEntry) -> Result<(), FeedbackError>
where
    S: FeedbackStore + ?Sized,
{
    entry.validate()?;
    store.insert(entry).await?;

    log::debug!("Feedback recorded ({} characters)", entry.feedback.len());
    Ok(())
}
