//! Entity model shared by every stage: printings, comments and the raw
//! records they are built from.
//!
//! Raw records (`RawCardEntry`, `RawComment`, `CardMetadata`) mirror the JSON
//! archive one-to-one and are only touched at the ingestion boundary. The
//! catalog converts them into [`Printing`] and [`Comment`], which carry the
//! ordering rules the rest of the pipeline relies on.

use serde::{Deserialize, Serialize};

/// Numeric identifier of a single printing.
pub type PrintingId = u64;

/// One comment as stored in an archive file.
///
/// The scraper writes `null` for fields it could not read, so everything but
/// the timestamp is optional here and defaulted in [`Comment::from`].
#[derive(Debug, Clone, Deserialize)]
pub struct RawComment {
    /// ISO-8601 timestamp; sorts lexically.
    pub datetime: String,
    #[serde(default)]
    pub author: Option<String>,
    /// Pre-rendered HTML body.
    #[serde(default)]
    pub text_parsed: Option<String>,
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub star_rating: Option<f64>,
}

/// One printing's entry inside an archive file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCardEntry {
    pub name: String,
    #[serde(default)]
    pub comments: Option<Vec<RawComment>>,
}

/// A printing's comments as yielded by a [`CardSource`](crate::ingest::CardSource).
#[derive(Debug, Clone)]
pub struct CardEntry {
    pub id: PrintingId,
    pub name: String,
    pub comments: Vec<RawComment>,
}

/// Cached metadata for a printing. Every field is optional; absent fields
/// stay unset on the printing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardMetadata {
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub set_code: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub collector_number: Option<String>,
    #[serde(default)]
    pub released_at: Option<String>,
    #[serde(default)]
    pub oracle_id: Option<String>,
}

/// A single comment on a printing.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub datetime: String,
    pub author: Option<String>,
    /// HTML body. Rewritten exactly once, after all sources are loaded.
    pub text: String,
    pub vote_count: u32,
    pub star_rating: f64,
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        Self {
            datetime: raw.datetime,
            author: raw.author.filter(|a| !a.trim().is_empty()),
            text: raw.text_parsed.unwrap_or_default(),
            vote_count: raw.vote_count.unwrap_or_default(),
            star_rating: raw.star_rating.unwrap_or_default(),
        }
    }
}

impl Comment {
    /// Whether this comment counts towards a card's average rating.
    pub fn is_rated(&self) -> bool {
        self.vote_count > 0
    }
}

/// Oracle ids name output files, so only `[A-Za-z0-9_-]` is accepted.
pub fn is_valid_oracle_id(oracle_id: &str) -> bool {
    !oracle_id.is_empty()
        && oracle_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// One numbered publication of a card.
#[derive(Debug, Clone)]
pub struct Printing {
    pub id: PrintingId,
    pub name: String,
    pub set_name: Option<String>,
    pub set_code: Option<String>,
    pub artist: Option<String>,
    pub collector_number: Option<String>,
    pub released_at: Option<String>,
    pub oracle_id: Option<String>,
    /// Site-relative path of the copied image (`images/<id>.<ext>`), filled
    /// in the first time the printing's page is generated.
    pub image_path: Option<String>,
    comments: Vec<Comment>,
}

impl Printing {
    pub fn new(id: PrintingId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            set_name: None,
            set_code: None,
            artist: None,
            collector_number: None,
            released_at: None,
            oracle_id: None,
            image_path: None,
            comments: Vec::new(),
        }
    }

    /// Copy every present metadata field onto the printing.
    pub fn apply_metadata(&mut self, meta: &CardMetadata) {
        self.set_name = meta.set_name.clone();
        self.set_code = meta.set_code.clone();
        self.artist = meta.artist.clone();
        self.collector_number = meta.collector_number.clone();
        self.released_at = meta.released_at.clone();
        self.oracle_id = meta.oracle_id.clone().filter(|o| is_valid_oracle_id(o));
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut [Comment] {
        &mut self.comments
    }

    /// Append comments and restore timestamp order.
    ///
    /// The sort is stable: comments sharing a timestamp keep the order in
    /// which they were loaded.
    pub fn extend_comments(&mut self, comments: impl IntoIterator<Item = Comment>) {
        self.comments.extend(comments);
        self.comments.sort_by(|a, b| a.datetime.cmp(&b.datetime));
    }

    /// Sort key for release-date ordering: missing dates sort last.
    pub fn release_key(&self) -> (bool, &str) {
        match self.released_at.as_deref() {
            Some(date) if !date.is_empty() => (false, date),
            _ => (true, ""),
        }
    }

    /// Short label for lists of printings, e.g. "Alpha (LEA)".
    pub fn set_label(&self) -> String {
        match (&self.set_name, &self.set_code) {
            (Some(name), Some(code)) => format!("{} ({})", name, code.to_uppercase()),
            (Some(name), None) => name.clone(),
            (None, Some(code)) => code.to_uppercase(),
            (None, None) => format!("#{}", self.id),
        }
    }
}
