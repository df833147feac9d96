//! Notification Formatter
//!
//! Pure render functions from `JobRecord`s to HTML-mode message text. Every
//! returned payload is at most `char_budget` UTF-16 code units, the unit the
//! channel's length limit is measured in. A payload that is too long gets
//! shrunk by structure (optional parts dropped, then fields cut), so markup
//! is never split and every tag stays closed.
//!
//! Grouped and paginated output share one accumulation path: a grouped
//! summary is a pagination that happened to fit on its first page.

use crate::config::{NotifyConfig, DEFAULT_CHAR_BUDGET};
use jobwatch_domain::JobRecord;
use serde::{Deserialize, Serialize};
use url::Url;

/// Separator between inline segments
pub const SEPARATOR: &str = " · ";

/// Title shown when a listing has none
pub const UNTITLED: &str = "Untitled";

/// Upper bound for any single inline field of a detailed message
pub const FIELD_CHAR_LIMIT: usize = 256;

/// A cut description shorter than this is left out instead
const MIN_DESCRIPTION_ROOM: usize = 40;

/// Field caps tried in turn when a detailed message is still too long
const FIELD_SHRINK_STEPS: [usize; 7] = [FIELD_CHAR_LIMIT, 128, 64, 32, 16, 8, 0];

const LINE_GAP: &str = "\n\n";
const ELLIPSIS: char = '…';

/// Which render to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatMode {
    /// The first job as one detailed message
    SingleDetailed,
    /// Numbered summary of all jobs, paginated when over budget
    GroupedSummary,
    /// One detailed message per job
    Individual,
}

/// Render parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Maximum UTF-16 code units per payload
    pub char_budget: usize,
    /// Base for resolving relative listing links
    pub link_base: Option<Url>,
}

impl FormatOptions {
    /// Derive render parameters from notifier configuration
    pub fn from_config(config: &NotifyConfig) -> Self {
        Self {
            char_budget: config.char_budget,
            link_base: config.link_base.as_deref().and_then(|base| Url::parse(base).ok()),
        }
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            char_budget: DEFAULT_CHAR_BUDGET,
            link_base: None,
        }
    }
}

/// One sealed summary payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Message text
    pub text: String,
    /// Number of jobs listed on this page
    pub jobs: usize,
}

/// Render `jobs` in the given mode
pub fn format(jobs: &[JobRecord], mode: FormatMode, options: &FormatOptions) -> Vec<String> {
    match mode {
        FormatMode::SingleDetailed => jobs
            .first()
            .map(|job| format_detailed(job, options))
            .into_iter()
            .collect(),
        FormatMode::GroupedSummary => paginate(jobs, options)
            .into_iter()
            .map(|page| page.text)
            .collect(),
        FormatMode::Individual => jobs
            .iter()
            .map(|job| format_detailed(job, options))
            .collect(),
    }
}

/// Length as the channel measures it (UTF-16 code units)
///
/// Never less than the Unicode scalar count, so a payload within budget
/// here is within budget by either measure.
pub fn wire_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn escaped(ch: char) -> Option<&'static str> {
    match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        _ => None,
    }
}

/// Escape text for the HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match escaped(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    out
}

/// Escape `text` and cut it to `max_units`, never splitting an entity
///
/// A cut result ends with `…`, which counts toward the limit.
pub fn truncate_escaped(text: &str, max_units: usize) -> String {
    let full = escape_html(text);
    if wire_len(&full) <= max_units {
        return full;
    }
    if max_units == 0 {
        return String::new();
    }

    let ellipsis = ELLIPSIS.len_utf16();
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        // Entities are ASCII: byte length equals UTF-16 length
        let width = escaped(ch).map_or(ch.len_utf16(), str::len);
        if used + width + ellipsis > max_units {
            break;
        }
        match escaped(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
        used += width;
    }
    out.push(ELLIPSIS);
    out
}

/// Absolute link for a job, resolving relative hrefs against the base
pub fn resolve_link(job: &JobRecord, options: &FormatOptions) -> Option<String> {
    let href = job.link.as_deref()?.trim();
    if href.is_empty() {
        return None;
    }

    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => options
            .link_base
            .as_ref()?
            .join(href)
            .ok()
            .map(|url| url.to_string()),
        Err(_) => None,
    }
}

fn field(value: &Option<String>, cap: usize) -> String {
    value
        .as_deref()
        .map(|text| truncate_escaped(text, cap))
        .unwrap_or_default()
}

/// Escaped inline fields of a detailed message, each cut to one cap
struct DetailedFields {
    title: String,
    job_type: String,
    budget: String,
    tier: String,
    duration: String,
    skills: String,
    feedback: String,
    payment: String,
    spend: String,
    country: String,
    proposals: String,
    posted: String,
}

impl DetailedFields {
    fn new(job: &JobRecord, cap: usize) -> Self {
        Self {
            title: job
                .job_title
                .as_deref()
                .map(|title| truncate_escaped(title, cap))
                .unwrap_or_else(|| UNTITLED.to_string()),
            job_type: field(&job.job_type, cap),
            budget: field(&job.budget, cap),
            tier: field(&job.contractor_tier, cap),
            duration: field(&job.duration, cap),
            skills: truncate_escaped(&job.attributes_items.join(SEPARATOR), cap),
            feedback: field(&job.client_feedback, cap),
            payment: field(&job.client_payment_status, cap),
            spend: field(&job.client_spend, cap),
            country: field(&job.client_country, cap),
            proposals: field(&job.proposals, cap),
            posted: field(&job.posted_on, cap),
        }
    }

    /// Full message; `description` is already escaped
    fn render(&self, description: Option<&str>, link: Option<&str>) -> String {
        let mut text = format!(
            "🔹 <b>{title}</b>\n\n\
             📝 {job_type}{sep}<b>{budget}</b>{sep}{tier}{sep}{duration}\n\n\
             🗃 <b>Skills</b>\n{skills}\n\n\
             🤵 <b>About Client</b>\n\
             ⭐ {feedback}{sep}{payment}{sep}{spend}\n\
             🌎 {country} 🚀 {proposals}\n\n",
            title = self.title,
            job_type = self.job_type,
            budget = self.budget,
            tier = self.tier,
            duration = self.duration,
            skills = self.skills,
            feedback = self.feedback,
            payment = self.payment,
            spend = self.spend,
            country = self.country,
            proposals = self.proposals,
            sep = SEPARATOR,
        );
        if let Some(description) = description {
            text.push_str(&description_block(description));
        }
        text.push_str("⏳ ");
        text.push_str(&self.posted);
        if let Some(link) = link {
            text.push_str(LINE_GAP);
            text.push_str(&format!("🔗 <a href=\"{}\">View job</a>", escape_html(link)));
        }
        text
    }
}

fn description_block(description: &str) -> String {
    format!("<b>Description</b>\n<blockquote>{}</blockquote>{}", description, LINE_GAP)
}

/// Render with the description cut to the room left; `None` if it does not fit
fn fit_detailed(
    fields: &DetailedFields,
    description: Option<&str>,
    link: Option<&str>,
    budget: usize,
) -> Option<String> {
    let bare = fields.render(None, link);
    let bare_len = wire_len(&bare);

    let Some(text) = description.filter(|text| !text.trim().is_empty()) else {
        return (bare_len <= budget).then_some(bare);
    };

    let room = budget.checked_sub(bare_len + wire_len(&description_block("")))?;
    if room < wire_len(&escape_html(text)).min(MIN_DESCRIPTION_ROOM) {
        return None;
    }
    Some(fields.render(Some(&truncate_escaped(text, room)), link))
}

/// Rich single-job message
///
/// Missing fields render as empty segments. The description is cut to the
/// room the rest of the message leaves. When even that is too long, the
/// link goes first, then the description block, then every field is cut
/// further until the message fits.
pub fn format_detailed(job: &JobRecord, options: &FormatOptions) -> String {
    let budget = options.char_budget;
    let link = resolve_link(job, options);
    let description = job.job_description_text.as_deref();

    let fields = DetailedFields::new(job, FIELD_CHAR_LIMIT);
    if let Some(text) = fit_detailed(&fields, description, link.as_deref(), budget) {
        return text;
    }
    if link.is_some() {
        if let Some(text) = fit_detailed(&fields, description, None, budget) {
            return text;
        }
    }

    for cap in FIELD_SHRINK_STEPS {
        let text = DetailedFields::new(job, cap).render(None, None);
        if wire_len(&text) <= budget {
            return text;
        }
    }
    // Only reachable below MIN_CHAR_BUDGET
    DetailedFields::new(job, 0).render(None, None)
}

/// Summary line; `title` and `uid` are already escaped
fn render_summary(number: usize, title: &str, uid: Option<&str>, link: Option<&str>) -> String {
    let mut line = format!("{}. <b>{}</b>", number, title);
    if let Some(uid) = uid {
        line.push_str(&format!("\n   🆔 <code>{}</code>", uid));
    }
    if let Some(link) = link {
        line.push_str(&format!("\n   🔗 <a href=\"{}\">View</a>", escape_html(link)));
    }
    line
}

/// Numbered summary line; the number is the job's page position plus one
pub fn format_summary_line(job: &JobRecord, options: &FormatOptions) -> String {
    let title = escape_html(job.job_title.as_deref().unwrap_or(UNTITLED));
    let uid = job.uid.as_deref().map(escape_html);
    let link = resolve_link(job, options);
    render_summary(job.index + 1, &title, uid.as_deref(), link.as_deref())
}

/// Summary line shrunk to `room` units
///
/// The link goes first, then the title is cut, then the identifier, and
/// as a last resort the identifier line is dropped.
fn fit_summary_line(job: &JobRecord, options: &FormatOptions, room: usize) -> String {
    let line = format_summary_line(job, options);
    if wire_len(&line) <= room {
        return line;
    }

    let number = job.index + 1;
    let raw_title = job.job_title.as_deref().unwrap_or(UNTITLED);
    let uid = job.uid.as_deref().map(escape_html);

    let without_link = render_summary(number, &escape_html(raw_title), uid.as_deref(), None);
    if wire_len(&without_link) <= room {
        return without_link;
    }

    let bare = wire_len(&render_summary(number, "", uid.as_deref(), None));
    if bare <= room {
        let title = truncate_escaped(raw_title, room - bare);
        return render_summary(number, &title, uid.as_deref(), None);
    }

    if let Some(raw_uid) = job.uid.as_deref() {
        let skeleton = wire_len(&render_summary(number, "", Some(""), None));
        if skeleton <= room {
            let uid = truncate_escaped(raw_uid, room - skeleton);
            return render_summary(number, "", Some(&uid), None);
        }
    }
    render_summary(number, "", None, None)
}

/// Header of a grouped summary (first page)
pub fn grouped_header(count: usize) -> String {
    format!("📋 <b>New jobs available ({})</b>{}", count, LINE_GAP)
}

/// Header of every page after the first
pub fn continuation_header() -> String {
    format!("📋 <b>New jobs (continued)</b>{}", LINE_GAP)
}

struct PageBuilder {
    text: String,
    units: usize,
    jobs: usize,
}

impl PageBuilder {
    fn new(header: String) -> Self {
        let units = wire_len(&header);
        Self { text: header, units, jobs: 0 }
    }

    /// Length check on the prospective concatenation, before appending
    fn fits(&self, line_units: usize, budget: usize) -> bool {
        let gap = if self.jobs > 0 { wire_len(LINE_GAP) } else { 0 };
        self.units + gap + line_units <= budget
    }

    fn push(&mut self, line: &str, line_units: usize) {
        if self.jobs > 0 {
            self.text.push_str(LINE_GAP);
            self.units += wire_len(LINE_GAP);
        }
        self.text.push_str(line);
        self.units += line_units;
        self.jobs += 1;
    }

    fn seal(self) -> Page {
        Page {
            text: self.text,
            jobs: self.jobs,
        }
    }
}

/// Accumulate summary lines into pages under the budget
///
/// The first page carries the grouped header with the total count; later
/// pages carry the continuation header. The final accumulator is always
/// sealed. Requires a budget of at least `MIN_CHAR_BUDGET`.
pub fn paginate(jobs: &[JobRecord], options: &FormatOptions) -> Vec<Page> {
    if jobs.is_empty() {
        return Vec::new();
    }

    let budget = options.char_budget;
    let continuation = continuation_header();
    let first = grouped_header(jobs.len());
    let room = budget.saturating_sub(wire_len(&first).max(wire_len(&continuation)));

    let mut pages = Vec::new();
    let mut current = PageBuilder::new(first);

    for job in jobs {
        let line = fit_summary_line(job, options, room);
        let line_units = wire_len(&line);

        if !current.fits(line_units, budget) {
            pages.push(current.seal());
            current = PageBuilder::new(continuation.clone());
        }
        current.push(&line, line_units);
    }
    pages.push(current.seal());

    pages
}
