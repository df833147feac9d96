//! Jobwatch Extractor
//!
//! Turns a scraped job-listing page into structured [`JobRecord`]s and decides
//! whether a page's content is new.
//!
//! # Architecture
//!
//! ```text
//! HTML → ListingParser → FieldExtractor (per fragment) → Vec<JobRecord> → ChangeDetector
//! ```
//!
//! # Example Usage
//!
//! ```
//! use jobwatch_extractor::{ChangeDetector, ExtractorConfig, ListingParser};
//!
//! # fn example() -> Result<(), jobwatch_extractor::ExtractorError> {
//! let parser = ListingParser::new(&ExtractorConfig::default())?;
//! let jobs = parser.parse("<section><h2>Build a website</h2></section>")?;
//! assert_eq!(jobs[0].job_title.as_deref(), Some("Build a website"));
//!
//! let mut detector = ChangeDetector::new();
//! assert!(detector.has_changed(&jobs)?);
//! assert!(!detector.has_changed(&jobs)?);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! [`JobRecord`]: jobwatch_domain::JobRecord

#![warn(missing_docs)]

mod change;
mod config;
mod error;
mod fields;
mod parser;

pub use change::{fingerprint, ChangeDetector};
pub use config::{ExtractorConfig, DEFAULT_LISTING_SELECTOR, DEFAULT_MAX_DOCUMENT_BYTES};
pub use error::ExtractorError;
pub use fields::{FieldExtractor, UID_ATTRIBUTE};
pub use parser::ListingParser;
