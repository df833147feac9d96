//! Integration tests for jobwatch-extractor
//!
//! These tests run the parser against page-shaped documents.

use jobwatch_domain::FreelancersToHire;
use jobwatch_extractor::{ChangeDetector, ExtractorConfig, ListingParser};
use proptest::prelude::*;

const FEED_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Most recent jobs</title></head>
<body>
  <nav><h1>Find work</h1></nav>
  <div data-test="job-tile-list">
    <section data-ev-opening_uid="1001" class="air3-card-section">
      <small data-test="posted-on">Posted 3 minutes ago</small>
      <h3 class="job-tile-title"><a href="/jobs/Scraper_~011/">Build a website</a></h3>
      <strong data-test="job-type">Fixed-price</strong>
      <span data-test="contractor-tier">Intermediate</span>
      <span data-test="job-description-text">We need a landing page &amp; blog.</span>
      <span data-test="proposals">Less than 5</span>
    </section>
    <section data-ev-opening_uid="1002" class="air3-card-section">
      <h3 class="job-tile-title"><a href="/jobs/Api_~012/">Rust API</a></h3>
      <strong data-test="job-type">Hourly</strong>
      <span data-test="budget">$45.00</span>
      <a data-test="attr-item">Rust</a>
      <a data-test="attr-item">Axum</a>
      <span data-test="payment-verification-status">Payment verified</span>
      <span data-test="formatted-amount">$2K+</span>
      <span data-ev-sublocation="!rating">5.0</span>
      <span data-test="client-country">Canada</span>
      <span data-test="freelancers-to-hire">3</span>
    </section>
  </div>
</body>
</html>"#;

fn parser() -> ListingParser {
    ListingParser::new(&ExtractorConfig::default()).unwrap()
}

#[test]
fn test_feed_page_extraction() {
    let jobs = parser().parse(FEED_PAGE).unwrap();
    assert_eq!(jobs.len(), 2);

    let first = &jobs[0];
    assert_eq!(first.uid.as_deref(), Some("1001"));
    assert_eq!(first.index, 0);
    assert_eq!(first.job_title.as_deref(), Some("Build a website"));
    assert_eq!(first.link.as_deref(), Some("/jobs/Scraper_~011/"));
    assert_eq!(first.job_description_text.as_deref(), Some("We need a landing page & blog."));
    assert!(first.attributes_items.is_empty());
    assert!(first.budget.is_none());
    assert!(first.client_country.is_none());
    assert_eq!(first.freelancers_to_hire, FreelancersToHire::Unlisted(1));

    let second = &jobs[1];
    assert_eq!(second.index, 1);
    assert_eq!(second.budget.as_deref(), Some("$45.00"));
    assert_eq!(second.attributes_items, vec!["Rust", "Axum"]);
    assert_eq!(second.freelancers_to_hire, FreelancersToHire::Listed("3".to_string()));
    assert!(second.posted_on.is_none());
}

#[test]
fn test_title_scoped_to_fragment() {
    // The page-level <h1> in <nav> must not leak into any record
    let jobs = parser().parse(FEED_PAGE).unwrap();
    assert!(jobs.iter().all(|job| job.job_title.as_deref() != Some("Find work")));
}

#[test]
fn test_reparsed_page_is_unchanged() {
    let parser = parser();
    let mut detector = ChangeDetector::new();

    let first = parser.parse(FEED_PAGE).unwrap();
    let again = parser.parse(FEED_PAGE).unwrap();

    assert!(detector.has_changed(&first).unwrap());
    assert!(!detector.has_changed(&again).unwrap());

    let edited = FEED_PAGE.replace("Less than 5", "5 to 10");
    assert!(detector.has_changed(&parser.parse(&edited).unwrap()).unwrap());
}

proptest! {
    /// Property: one record per fragment, index equals position
    #[test]
    fn test_record_count_and_order(titles in proptest::collection::vec("[A-Za-z][A-Za-z ]{0,20}", 0..25)) {
        let document: String = titles
            .iter()
            .map(|title| format!("<section><h2>{}</h2></section>", title))
            .collect();

        let jobs = parser().parse(&document).unwrap();
        prop_assert_eq!(jobs.len(), titles.len());
        for (position, (job, title)) in jobs.iter().zip(&titles).enumerate() {
            prop_assert_eq!(job.index, position);
            prop_assert_eq!(job.job_title.as_deref(), Some(title.trim()));
        }
    }
}
