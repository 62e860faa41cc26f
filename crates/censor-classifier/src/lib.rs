//! censor-classifier: age-rating classification of media content.
//!
//! Renders metadata, a transcript and vision labels into a prompt, asks an
//! LLM backend (hosted or in-process) for a rating, and validates the answer
//! into one of four tiers: 6+, 12+, 16+, 18+.
//!
//! # Example
//! ```no_run
//! use censor_classifier::{Classifier, ClassifierConfig, ClassificationInput};
//!
//! # async fn run() -> censor_classifier::Result<()> {
//! let classifier = Classifier::new(ClassifierConfig::default()).await?;
//! let input = ClassificationInput::new(
//!     Default::default(),
//!     "Family-friendly content with no violence",
//!     vec!["family".to_string(), "outdoor".to_string()],
//! );
//! let result = classifier.classify(&input).await;
//! println!("{}: {}", result.rating, result.reason);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod backend;
pub mod classifier;
pub mod config;
pub mod error;
pub mod parser;
pub mod prompt;
pub mod rating;
pub mod selector;

pub use classifier::Classifier;
pub use config::{BackendKind, ClassifierConfig};
pub use error::{ClassifierError, Result};
pub use rating::{ClassificationInput, ClassificationResult, Rating};
pub use selector::Availability;
