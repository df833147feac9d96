//! Field Extractor: one listing fragment to one `JobRecord`
//!
//! Each field is resolved by a single selector query scoped to the fragment.
//! A miss only affects that field.

use crate::error::ExtractorError;
use jobwatch_domain::{FreelancersToHire, JobRecord};
use scraper::{ElementRef, Selector};

/// Data attribute carrying the listing identifier
pub const UID_ATTRIBUTE: &str = "data-ev-opening_uid";

const POSTED_ON: &str = r#"[data-test="posted-on"]"#;
const JOB_TITLE: &str = "h1, h2, h3";
const TITLE_LINK: &str = "a[href]";
const JOB_TYPE: &str = r#"[data-test="job-type"]"#;
const CONTRACTOR_TIER: &str = r#"[data-test="contractor-tier"]"#;
const BUDGET: &str = r#"[data-test="budget"]"#;
const DURATION: &str = r#"[data-test="duration"]"#;
const JOB_DESCRIPTION: &str = r#"[data-test="job-description-text"]"#;
const ATTRIBUTE_ITEM: &str = r#"[data-test="attr-item"]"#;
const PAYMENT_STATUS: &str = r#"[data-test="payment-verification-status"]"#;
const CLIENT_SPEND: &str = r#"[data-test="formatted-amount"]"#;
const CLIENT_FEEDBACK: &str = r#"[data-ev-sublocation="!rating"]"#;
const CLIENT_COUNTRY: &str = r#"[data-test="client-country"]"#;
const PROPOSALS: &str = r#"[data-test="proposals"]"#;
const FREELANCERS_TO_HIRE: &str = r#"[data-test="freelancers-to-hire"]"#;

/// Compile a CSS selector, keeping the source text in the error
pub(crate) fn compile(selector: &str) -> Result<Selector, ExtractorError> {
    Selector::parse(selector).map_err(|e| ExtractorError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Maps a listing fragment into a `JobRecord`
///
/// Selectors are compiled once and reused for every fragment.
#[derive(Debug)]
pub struct FieldExtractor {
    posted_on: Selector,
    job_title: Selector,
    title_link: Selector,
    job_type: Selector,
    contractor_tier: Selector,
    budget: Selector,
    duration: Selector,
    job_description: Selector,
    attribute_item: Selector,
    payment_status: Selector,
    client_spend: Selector,
    client_feedback: Selector,
    client_country: Selector,
    proposals: Selector,
    freelancers_to_hire: Selector,
}

impl FieldExtractor {
    /// Compile the field selectors
    pub fn new() -> Result<Self, ExtractorError> {
        Ok(Self {
            posted_on: compile(POSTED_ON)?,
            job_title: compile(JOB_TITLE)?,
            title_link: compile(TITLE_LINK)?,
            job_type: compile(JOB_TYPE)?,
            contractor_tier: compile(CONTRACTOR_TIER)?,
            budget: compile(BUDGET)?,
            duration: compile(DURATION)?,
            job_description: compile(JOB_DESCRIPTION)?,
            attribute_item: compile(ATTRIBUTE_ITEM)?,
            payment_status: compile(PAYMENT_STATUS)?,
            client_spend: compile(CLIENT_SPEND)?,
            client_feedback: compile(CLIENT_FEEDBACK)?,
            client_country: compile(CLIENT_COUNTRY)?,
            proposals: compile(PROPOSALS)?,
            freelancers_to_hire: compile(FREELANCERS_TO_HIRE)?,
        })
    }

    /// Extract a record from `fragment`, which sits at `index` on the page
    pub fn extract(&self, fragment: ElementRef<'_>, index: usize) -> JobRecord {
        let element = fragment.value();
        let title = fragment.select(&self.job_title).next();

        JobRecord {
            uid: element.attr(UID_ATTRIBUTE).map(str::to_string),
            index,
            classes: element
                .attr("class")
                .filter(|classes| !classes.is_empty())
                .map(str::to_string),
            posted_on: first_text(fragment, &self.posted_on),
            job_title: title.map(trimmed_text),
            job_type: first_text(fragment, &self.job_type),
            contractor_tier: first_text(fragment, &self.contractor_tier),
            budget: first_text(fragment, &self.budget),
            duration: first_text(fragment, &self.duration),
            job_description_text: first_text(fragment, &self.job_description),
            attributes_items: fragment
                .select(&self.attribute_item)
                .map(trimmed_text)
                .collect(),
            client_payment_status: first_text(fragment, &self.payment_status),
            client_spend: first_text(fragment, &self.client_spend),
            client_feedback: first_text(fragment, &self.client_feedback),
            client_country: first_text(fragment, &self.client_country),
            proposals: first_text(fragment, &self.proposals),
            freelancers_to_hire: first_text(fragment, &self.freelancers_to_hire)
                .map(FreelancersToHire::Listed)
                .unwrap_or_default(),
            link: title.and_then(|heading| {
                heading
                    .select(&self.title_link)
                    .next()
                    .and_then(|anchor| anchor.value().attr("href"))
                    .map(|href| href.trim().to_string())
            }),
        }
    }
}

/// Text content of the element, whitespace-trimmed at both ends
fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match inside `fragment`
fn first_text(fragment: ElementRef<'_>, selector: &Selector) -> Option<String> {
    fragment.select(selector).next().map(trimmed_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn extract_first(html: &str) -> JobRecord {
        let document = Html::parse_document(html);
        let section = Selector::parse("section").unwrap();
        let fragment = document.select(&section).next().unwrap();
        FieldExtractor::new().unwrap().extract(fragment, 0)
    }

    #[test]
    fn test_title_without_skills_or_budget() {
        let job = extract_first("<section><h2> Build a website </h2></section>");

        assert_eq!(job.job_title.as_deref(), Some("Build a website"));
        assert!(job.attributes_items.is_empty());
        assert!(job.budget.is_none());
        assert_eq!(job.freelancers_to_hire, FreelancersToHire::Unlisted(1));
    }

    #[test]
    fn test_empty_fragment_has_only_defaults() {
        let job = extract_first("<section></section>");

        assert_eq!(job, JobRecord::new(0));
    }

    #[test]
    fn test_all_fields() {
        let job = extract_first(
            r#"<section data-ev-opening_uid="1899" class="air3-card  job-tile">
                <small data-test="posted-on"> 5 minutes ago </small>
                <h2><a href="/jobs/rust-dev_~01abc/"> Rust developer </a></h2>
                <ul>
                  <li data-test="job-type">Hourly: $40-$60</li>
                  <li data-test="contractor-tier">Expert</li>
                  <li data-test="budget">$500</li>
                  <li data-test="duration">1 to 3 months</li>
                </ul>
                <div data-test="job-description-text">
                    Write a scraper.
                </div>
                <span data-test="attr-item">Rust</span>
                <span data-test="attr-item"> Tokio </span>
                <span data-test="attr-item">Rust</span>
                <span data-test="payment-verification-status">Payment verified</span>
                <span data-test="formatted-amount">$10K+</span>
                <span data-ev-sublocation="!rating">4.9</span>
                <span data-test="client-country">Spain</span>
                <span data-test="proposals">5 to 10</span>
                <span data-test="freelancers-to-hire"> 2 </span>
            </section>"#,
        );

        assert_eq!(job.uid.as_deref(), Some("1899"));
        assert_eq!(job.classes.as_deref(), Some("air3-card  job-tile"));
        assert_eq!(job.posted_on.as_deref(), Some("5 minutes ago"));
        assert_eq!(job.job_title.as_deref(), Some("Rust developer"));
        assert_eq!(job.link.as_deref(), Some("/jobs/rust-dev_~01abc/"));
        assert_eq!(job.job_type.as_deref(), Some("Hourly: $40-$60"));
        assert_eq!(job.contractor_tier.as_deref(), Some("Expert"));
        assert_eq!(job.budget.as_deref(), Some("$500"));
        assert_eq!(job.duration.as_deref(), Some("1 to 3 months"));
        assert_eq!(job.job_description_text.as_deref(), Some("Write a scraper."));
        assert_eq!(job.attributes_items, vec!["Rust", "Tokio", "Rust"]);
        assert_eq!(job.client_payment_status.as_deref(), Some("Payment verified"));
        assert_eq!(job.client_spend.as_deref(), Some("$10K+"));
        assert_eq!(job.client_feedback.as_deref(), Some("4.9"));
        assert_eq!(job.client_country.as_deref(), Some("Spain"));
        assert_eq!(job.proposals.as_deref(), Some("5 to 10"));
        assert_eq!(job.freelancers_to_hire, FreelancersToHire::Listed("2".to_string()));
    }

    #[test]
    fn test_title_takes_first_heading_in_document_order() {
        let job = extract_first("<section><h3>Small</h3><h1>Big</h1></section>");
        assert_eq!(job.job_title.as_deref(), Some("Small"));
    }

    #[test]
    fn test_empty_class_attribute_is_null() {
        let job = extract_first(r#"<section class=""><h2>x</h2></section>"#);
        assert!(job.classes.is_none());
    }

    #[test]
    fn test_title_without_anchor_has_no_link() {
        let job = extract_first(r#"<section><h2>Plain</h2><a href="/elsewhere">x</a></section>"#);
        assert!(job.link.is_none());
    }

    #[test]
    fn test_invalid_selector_reports_source() {
        let err = compile("[[").unwrap_err();
        assert!(matches!(err, ExtractorError::InvalidSelector { ref selector, .. } if selector == "[["));
    }
}
