//! Job record module - the unit produced by the listing parser

use serde::{Deserialize, Serialize};
use std::fmt;

/// Headcount value used when a listing does not state how many freelancers it needs
pub const DEFAULT_FREELANCERS_TO_HIRE: u32 = 1;

/// Number of freelancers a listing wants to hire
///
/// Unlike every other optional field of a [`JobRecord`], absence does not
/// become `null`: it becomes the number `1`. Serialized untagged, so a listed
/// value is a JSON string and the fallback is a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FreelancersToHire {
    /// Trimmed text scraped from the listing
    Listed(String),
    /// Fallback count when the listing omits the element
    Unlisted(u32),
}

impl Default for FreelancersToHire {
    fn default() -> Self {
        FreelancersToHire::Unlisted(DEFAULT_FREELANCERS_TO_HIRE)
    }
}

impl fmt::Display for FreelancersToHire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreelancersToHire::Listed(text) => write!(f, "{}", text),
            FreelancersToHire::Unlisted(count) => write!(f, "{}", count),
        }
    }
}

/// One scraped job listing
///
/// Every optional field is extracted independently: a missing sub-element
/// only nulls its own field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// Opaque listing identifier from the fragment's data attribute
    pub uid: Option<String>,

    /// Zero-based position in the page's listing sequence
    pub index: usize,

    /// Raw class attribute of the fragment
    pub classes: Option<String>,

    /// Relative posting time ("2 hours ago")
    pub posted_on: Option<String>,

    /// Listing title
    pub job_title: Option<String>,

    /// Hourly / fixed-price label
    pub job_type: Option<String>,

    /// Experience level requested
    pub contractor_tier: Option<String>,

    /// Budget text
    pub budget: Option<String>,

    /// Estimated duration
    pub duration: Option<String>,

    /// Description body
    pub job_description_text: Option<String>,

    /// Skill tags in document order, duplicates preserved
    pub attributes_items: Vec<String>,

    /// Payment verification status of the client
    pub client_payment_status: Option<String>,

    /// Total client spend
    pub client_spend: Option<String>,

    /// Client rating
    pub client_feedback: Option<String>,

    /// Client location
    pub client_country: Option<String>,

    /// Proposal count bucket
    pub proposals: Option<String>,

    /// Headcount, `1` when unlisted
    pub freelancers_to_hire: FreelancersToHire,

    /// Href of the title anchor, as found in the markup
    pub link: Option<String>,
}

impl JobRecord {
    /// Create an empty record for the fragment at `index`
    pub fn new(index: usize) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Identifier suitable for logs; falls back to the page position
    pub fn display_id(&self) -> String {
        match &self.uid {
            Some(uid) => uid.clone(),
            None => format!("#{}", self.index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let job = JobRecord::new(3);
        assert_eq!(job.index, 3);
        assert!(job.uid.is_none());
        assert!(job.budget.is_none());
        assert!(job.attributes_items.is_empty());
        assert_eq!(job.freelancers_to_hire, FreelancersToHire::Unlisted(1));
    }

    #[test]
    fn test_serialized_field_names() {
        let mut job = JobRecord::new(0);
        job.job_title = Some("Build a website".to_string());

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["jobTitle"], "Build a website");
        assert_eq!(value["attributesItems"], serde_json::json!([]));
        assert!(value["budget"].is_null());
        assert_eq!(value["freelancersToHire"], 1);
    }

    #[test]
    fn test_listed_headcount_serializes_as_text() {
        let mut job = JobRecord::new(0);
        job.freelancers_to_hire = FreelancersToHire::Listed("3".to_string());

        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["freelancersToHire"], "3");
    }

    #[test]
    fn test_display_id() {
        let mut job = JobRecord::new(7);
        assert_eq!(job.display_id(), "#7");

        job.uid = Some("1899".to_string());
        assert_eq!(job.display_id(), "1899");
    }
}
