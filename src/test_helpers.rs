//! Shared builders for unit tests.
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let mut catalog = Catalog::new(NameMap::new(), metadata(&[(1, "o-1", Some("1993-08-05"))]));
//! catalog.load(&vec![entry(1, "Shock", &[("2008-01-01", "hello")])]).unwrap();
//! assert_eq!(comment_texts(&catalog, 1), vec!["hello"]);
//! ```

use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::types::{CardEntry, CardMetadata, Comment, PrintingId, RawComment};

// =========================================================================
// Record builders
// =========================================================================

/// An unrated comment with the given timestamp and body.
pub fn comment(datetime: &str, text: &str) -> Comment {
    Comment {
        datetime: datetime.to_string(),
        author: Some("tester".to_string()),
        text: text.to_string(),
        vote_count: 0,
        star_rating: 0.0,
    }
}

/// A comment with a vote count and star rating.
pub fn rated(vote_count: u32, star_rating: f64) -> Comment {
    Comment {
        vote_count,
        star_rating,
        ..comment("2010-01-01T00:00:00", "rated")
    }
}

/// A source entry whose comments are `(datetime, body)` pairs.
pub fn entry(id: PrintingId, name: &str, comments: &[(&str, &str)]) -> CardEntry {
    CardEntry {
        id,
        name: name.to_string(),
        comments: comments
            .iter()
            .map(|(datetime, text)| RawComment {
                datetime: datetime.to_string(),
                author: None,
                text_parsed: Some(text.to_string()),
                vote_count: None,
                star_rating: None,
            })
            .collect(),
    }
}

/// Metadata cache from `(id, oracle_id, released_at)` triples.
pub fn metadata(rows: &[(PrintingId, &str, Option<&str>)]) -> HashMap<PrintingId, CardMetadata> {
    rows.iter()
        .map(|(id, oracle_id, released_at)| {
            (
                *id,
                CardMetadata {
                    set_name: Some(format!("Set {}", id)),
                    set_code: Some(format!("s{}", id)),
                    released_at: released_at.map(String::from),
                    oracle_id: Some(oracle_id.to_string()),
                    ..Default::default()
                },
            )
        })
        .collect()
}

/// Forum auto-card markup referencing `name`.
pub fn auto_link(name: &str) -> String {
    format!(
        r#"<a href="/Pages/Card/Details.aspx?name={}" class="autoCard" data:cardname="{}">{}</a>"#,
        name.replace(' ', "%20"),
        name,
        name
    )
}

// =========================================================================
// Catalog lookups
// =========================================================================

/// Comment bodies of one printing, in stored order. Panics if absent.
pub fn comment_texts(catalog: &Catalog, id: PrintingId) -> Vec<String> {
    catalog
        .printing(id)
        .unwrap_or_else(|| panic!("printing {id} not found. Available: {:?}", catalog.ids()))
        .comments()
        .iter()
        .map(|c| c.text.clone())
        .collect()
}
