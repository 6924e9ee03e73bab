//! Derived views over the catalog: the alphabetical card index and the sitemap.
//!
//! Both are pure functions of a fully built [`Catalog`]; nothing here touches
//! the filesystem.
//!
//! ## Alphabet buckets
//!
//! Unique cards are grouped by the upper-cased first character of their name.
//! ASCII letters get their own bucket (`A`..`Z`); everything else, digits,
//! punctuation and non-ASCII letters alike, lands in `0-9`:
//!
//! ```text
//! "Wrath of God"  → W
//! "7th Edition"   → 0-9
//! "Ælfric"        → 0-9
//! ```

use crate::catalog::Catalog;
use crate::types::Comment;
use maud::html;
use std::collections::BTreeMap;

/// Bucket label for names that do not start with an ASCII letter.
pub const OTHER_BUCKET: &str = "0-9";

/// Letters shown in the index jump bar, including empty ones.
pub const ALPHABET: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One unique card on the index page.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSummary {
    pub name: String,
    pub oracle_id: String,
    pub total_comments: usize,
    pub avg_rating: f64,
    pub printings: usize,
}

/// Unique cards grouped into alphabet buckets.
#[derive(Debug, Clone, Default)]
pub struct CardIndex {
    pub buckets: BTreeMap<String, Vec<CardSummary>>,
}

impl CardIndex {
    pub fn alphabet(&self) -> &'static [char] {
        &ALPHABET
    }

    pub fn bucket(&self, label: &str) -> &[CardSummary] {
        self.buckets.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn card_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Bucket label for a card name.
pub fn bucket_for(name: &str) -> String {
    match name.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some(c) if c.is_ascii_alphabetic() => c.to_string(),
        _ => OTHER_BUCKET.to_string(),
    }
}

/// Average star rating over comments with at least one vote; 0 if none.
pub fn average_rating<'a>(comments: impl IntoIterator<Item = &'a Comment>) -> f64 {
    let (sum, count) = comments
        .into_iter()
        .filter(|c| c.is_rated())
        .fold((0.0, 0usize), |(sum, count), c| (sum + c.star_rating, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Summarize one group. `None` if the group is empty.
pub fn summarize(catalog: &Catalog, oracle_id: &str) -> Option<CardSummary> {
    let printings = catalog.group_printings(oracle_id);
    let representative = printings.first()?;
    let comments = printings.iter().flat_map(|p| p.comments());
    Some(CardSummary {
        name: representative.name.clone(),
        oracle_id: oracle_id.to_string(),
        total_comments: printings.iter().map(|p| p.comments().len()).sum(),
        avg_rating: average_rating(comments),
        printings: printings.len(),
    })
}

/// Build the alphabetical index of unique cards.
pub fn build_index(catalog: &Catalog) -> CardIndex {
    let mut cards: Vec<CardSummary> = catalog
        .groups()
        .filter_map(|(oracle_id, _)| summarize(catalog, oracle_id))
        .collect();
    cards.sort_by_cached_key(|c| c.name.to_lowercase());

    let mut index = CardIndex::default();
    for card in cards {
        index.buckets.entry(bucket_for(&card.name)).or_default().push(card);
    }
    index
}

/// One `<url>` element of the sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub priority: f32,
}

/// Prefix a site-relative path with the base URL, if any.
pub fn site_url(base_url: &str, path: &str) -> String {
    if base_url.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base_url, path)
    }
}

/// Sitemap entries: index page, every printing, then every multi-printing card.
pub fn build_sitemap(catalog: &Catalog, base_url: &str) -> Vec<SitemapEntry> {
    let mut entries = vec![SitemapEntry {
        loc: site_url(base_url, "index.html"),
        priority: 1.0,
    }];
    entries.extend(catalog.printings().map(|p| SitemapEntry {
        loc: site_url(base_url, &format!("cards/{}.html", p.id)),
        priority: 0.8,
    }));
    entries.extend(
        catalog
            .groups()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(oracle_id, _)| SitemapEntry {
                loc: site_url(base_url, &format!("cards/combined/{}.html", oracle_id)),
                priority: 0.9,
            }),
    );
    entries
}

/// Serialize sitemap entries as XML.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut lines = vec![
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        format!(r#"<urlset xmlns="{}">"#, SITEMAP_NAMESPACE),
    ];
    for entry in entries {
        // maud escapes the URL for us
        let loc = html! { (entry.loc) }.into_string();
        lines.push("  <url>".to_string());
        lines.push(format!("    <loc>{}</loc>", loc));
        lines.push(format!("    <priority>{:.1}</priority>", entry.priority));
        lines.push("  </url>".to_string());
    }
    lines.push("</urlset>".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::NameMap;
    use crate::test_helpers::*;
    use rstest::rstest;

    #[rstest]
    #[case("Wrath of God", "W")]
    #[case("wrath of god", "W")]
    #[case("7th Edition", "0-9")]
    #[case("Ælfric", "0-9")]
    #[case("\"Ach! Hans, Run!\"", "0-9")]
    #[case("", "0-9")]
    fn bucket_labels(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(bucket_for(name), expected);
    }

    #[test]
    fn average_ignores_unvoted_comments() {
        let comments = vec![rated(0, 5.0), rated(5, 4.0), rated(3, 2.0)];
        assert_eq!(average_rating(&comments), 3.0);
    }

    #[test]
    fn average_is_zero_without_votes() {
        let comments = vec![rated(0, 5.0), rated(0, 1.0)];
        assert_eq!(average_rating(&comments), 0.0);
        assert_eq!(average_rating(&Vec::<Comment>::new()), 0.0);
    }

    fn three_printing_catalog() -> Catalog {
        let mut catalog = Catalog::new(
            NameMap::new(),
            metadata(&[
                (1, "o-b", Some("2005-01-01")),
                (2, "o-b", Some("1999-01-01")),
                (3, "o-a", None),
            ]),
        );
        catalog
            .load(&vec![
                entry(1, "Wrath of God (Reprint)", &[]),
                entry(2, "Wrath of God", &[]),
                entry(3, "7th Edition Guy", &[]),
            ])
            .unwrap();
        catalog.build_grouping_index();
        catalog
    }

    #[test]
    fn index_uses_earliest_printing_as_representative() {
        let mut catalog = three_printing_catalog();
        catalog.printing_mut(1).unwrap().extend_comments([rated(5, 4.0)]);
        catalog.printing_mut(2).unwrap().extend_comments([rated(0, 1.0), rated(3, 2.0)]);

        let index = build_index(&catalog);
        let w = index.bucket("W");
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].name, "Wrath of God");
        assert_eq!(w[0].oracle_id, "o-b");
        assert_eq!(w[0].total_comments, 3);
        assert_eq!(w[0].printings, 2);
        assert_eq!(w[0].avg_rating, 3.0);

        assert_eq!(index.bucket("0-9")[0].name, "7th Edition Guy");
        assert_eq!(index.card_count(), 2);
        assert!(index.bucket("Q").is_empty());
        assert_eq!(index.alphabet().len(), 26);
    }

    #[test]
    fn bucket_contents_sorted_case_insensitively() {
        let mut catalog = Catalog::new(
            NameMap::new(),
            metadata(&[(1, "o1", None), (2, "o2", None), (3, "o3", None)]),
        );
        catalog
            .load(&vec![
                entry(1, "banshee", &[]),
                entry(2, "Bayou", &[]),
                entry(3, "Ball Lightning", &[]),
            ])
            .unwrap();
        catalog.build_grouping_index();

        let index = build_index(&catalog);
        let names: Vec<&str> = index
            .bucket("B")
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ball Lightning", "banshee", "Bayou"]);
    }

    #[test]
    fn sitemap_counts_by_category() {
        let catalog = three_printing_catalog();
        let entries = build_sitemap(&catalog, "");

        let count = |p: f32| entries.iter().filter(|e| e.priority == p).count();
        assert_eq!(count(1.0), 1);
        assert_eq!(count(0.8), 3);
        assert_eq!(count(0.9), 1);

        let locs: Vec<&str> = entries.iter().map(|e| e.loc.as_str()).collect();
        assert_eq!(
            locs,
            vec![
                "index.html",
                "cards/1.html",
                "cards/2.html",
                "cards/3.html",
                "cards/combined/o-b.html",
            ]
        );
    }

    #[test]
    fn sitemap_prefixes_base_url() {
        let catalog = three_printing_catalog();
        let entries = build_sitemap(&catalog, "https://example.org/archive");
        assert_eq!(entries[0].loc, "https://example.org/archive/index.html");
        assert_eq!(entries[1].loc, "https://example.org/archive/cards/1.html");
    }

    #[test]
    fn sitemap_xml_structure() {
        let xml = render_sitemap(&[
            SitemapEntry {
                loc: "index.html".into(),
                priority: 1.0,
            },
            SitemapEntry {
                loc: "cards/1.html?a=1&b=2".into(),
                priority: 0.8,
            },
        ]);
        let lines: Vec<&str> = xml.lines().collect();
        assert_eq!(lines[0], r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        assert_eq!(
            lines[1],
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#
        );
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(xml.contains("cards/1.html?a=1&amp;b=2"));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.ends_with("</urlset>"));
    }
}
