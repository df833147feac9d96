//! Listing Parser: whole document to an ordered sequence of records

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::fields::{compile, FieldExtractor};
use jobwatch_domain::JobRecord;
use scraper::{Html, Selector};
use tracing::debug;

/// Locates listing fragments and runs the field extractor on each
#[derive(Debug)]
pub struct ListingParser {
    listing: Selector,
    fields: FieldExtractor,
    max_document_bytes: usize,
}

impl ListingParser {
    /// Create a parser from configuration
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            listing: compile(&config.listing_selector)?,
            fields: FieldExtractor::new()?,
            max_document_bytes: config.max_document_bytes,
        })
    }

    /// Parse a raw HTML document
    ///
    /// Records come back in document order with `index` equal to their
    /// position. A document without listings yields an empty vector. The
    /// HTML5 tree builder recovers from malformed markup, so the only
    /// failure is a document over the size limit.
    pub fn parse(&self, document: &str) -> Result<Vec<JobRecord>, ExtractorError> {
        if document.len() > self.max_document_bytes {
            return Err(ExtractorError::DocumentTooLarge(
                document.len(),
                self.max_document_bytes,
            ));
        }

        let html = Html::parse_document(document);
        let jobs: Vec<JobRecord> = html
            .select(&self.listing)
            .enumerate()
            .map(|(index, fragment)| self.fields.extract(fragment, index))
            .collect();

        debug!(
            "Parsed {} listings from {} byte document ({} parse errors recovered)",
            jobs.len(),
            document.len(),
            html.errors.len()
        );

        Ok(jobs)
    }
}
