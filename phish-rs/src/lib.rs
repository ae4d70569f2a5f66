//! phish-rs: phishing classifier for URLs and email bodies
//!
//! A TF-IDF + logistic regression model scores text, and deterministic
//! heuristics (raw-IP URLs) can raise that score before a threshold turns it
//! into a verdict. Diagnostic features are returned alongside every verdict.
//!
//! # Components
//!
//! - Feature extraction and decision fusion (pure, no I/O)
//! - Offline trainer with a bundled bootstrap dataset
//! - Scorer service over HTTP with optional SQLite scan history
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! listen_addr = "0.0.0.0:8000"
//!
//! [model]
//! path = "models/phishing_model.json"
//!
//! [decision]
//! threshold = 0.5
//! ip_confidence_floor = 0.85
//!
//! [history]
//! database_url = "sqlite://scans.db?mode=rwc"
//! ```

pub mod api;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod fusion;
pub mod history;
pub mod logging;
pub mod scorer;
pub mod trainer;
pub mod types;

pub use api::ApiServer;
pub use classifier::{TextClassifier, TextPipeline};
pub use config::Config;
pub use error::{PhishError, Result};
pub use fusion::FusionPolicy;
pub use history::ScanHistory;
pub use scorer::Scorer;
pub use trainer::Trainer;
pub use types::{ClassificationRequest, ClassificationResult, FeatureSet, InputKind, Label};
