//! Cross-reference rewriting for comment bodies.
//!
//! Archived comments link to other cards through the forum's auto-card markup:
//!
//! ```text
//! <a href="/Pages/Card/Details.aspx?name=Lightning%20Bolt" class="autoCard" data:cardname="Lightning Bolt">Bolt</a>
//! ```
//!
//! Those links point at a site that no longer exists. [`rewrite_card_links`]
//! turns each one into a link to the local printing page, or into its bare
//! visible text when the name is unknown. The markup shape is narrow and fixed,
//! so a single regex pass is enough; no HTML parsing happens here.

use crate::types::PrintingId;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static AUTO_CARD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<a href="/Pages/Card/Details\.aspx\?name=([^"]+)" class="autoCard" data:cardname="[^"]*">(.*?)</a>"#,
    )
    .unwrap()
});

/// Case-insensitive lookup from card display name to printing identifier.
///
/// Keys are stored lower-cased; lookups lower-case the query.
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    ids: HashMap<String, PrintingId>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, id: PrintingId) {
        self.ids.insert(name.to_lowercase(), id);
    }

    pub fn get(&self, name: &str) -> Option<PrintingId> {
        self.ids.get(&name.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<(String, PrintingId)> for NameMap {
    fn from_iter<I: IntoIterator<Item = (String, PrintingId)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, id) in iter {
            map.insert(&name, id);
        }
        map
    }
}

/// Relative href of a printing page as seen from another page in `cards/`.
pub fn card_href(id: PrintingId) -> String {
    format!("../cards/{}.html", id)
}

/// Rewrite every auto-card link in `text` against `names`.
pub fn rewrite_card_links(text: &str, names: &NameMap) -> String {
    AUTO_CARD_LINK
        .replace_all(text, |caps: &Captures| {
            let name = caps[1].replace("%20", " ");
            // An empty label would leave nothing to click.
            let label = match &caps[2] {
                "" => name.as_str(),
                label => label,
            };
            match names.get(&name) {
                Some(id) => format!(r#"<a href="{}" class="card-link">{}</a>"#, card_href(id), label),
                None => label.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auto_link(name: &str, label: &str) -> String {
        format!(
            r#"(?s)<a href="/Pages/Card/Details.aspx?name={}" class="autoCard" data:cardname="{}">{}</a>"#,
            name,
            name.replace("%20", " "),
            label
        )
    }

    fn names() -> NameMap {
        [("Lightning Bolt".to_string(), 209), ("Progenitus".to_string(), 179496)]
            .into_iter()
            .collect()
    }

    #[test]
    fn known_card_becomes_local_link() {
        let text = format!("Better than {} any day.", auto_link("Progenitus", "Progenitus"));
        let out = rewrite_card_links(&text, &names());
        assert_eq!(
            out,
            r#"Better than <a href="../cards/179496.html" class="card-link">Progenitus</a> any day."#
        );
    }

    #[test]
    fn encoded_spaces_and_case_are_normalized() {
        let text = auto_link("LIGHTNING%20BOLT", "bolt it");
        let out = rewrite_card_links(&text, &names());
        assert!(out.contains("cards/209.html"));
        assert!(out.contains(">bolt it</a>"));
    }

    #[test]
    fn unknown_card_degrades_to_text() {
        let text = format!("See {}.", auto_link("Nonexistent%20Card", "that card"));
        let out = rewrite_card_links(&text, &names());
        assert_eq!(out, "See that card.");
        assert!(!out.contains("<a"));
    }

    #[test]
    fn multiple_links_in_one_body() {
        let text = format!(
            "{} and {} and {}",
            auto_link("Progenitus", "P"),
            auto_link("Unknown", "U"),
            auto_link("Lightning%20Bolt", "B")
        );
        let out = rewrite_card_links(&text, &names());
        assert_eq!(
            out,
            r#"<a href="../cards/179496.html" class="card-link">P</a> and U and <a href="../cards/209.html" class="card-link">B</a>"#
        );
    }

    #[test]
    fn rewriting_twice_is_a_no_op() {
        let text = format!("{} {}", auto_link("Progenitus", "Progenitus"), auto_link("Nope", "nope"));
        let once = rewrite_card_links(&text, &names());
        let twice = rewrite_card_links(&once, &names());
        assert_eq!(once, twice);
    }

    #[test]
    fn labels_with_markup_are_rewritten() {
        let text = format!("Cast {} now.", auto_link("Lightning%20Bolt", "<i>Bolt</i>"));
        let out = rewrite_card_links(&text, &names());
        assert_eq!(
            out,
            r#"Cast <a href="../cards/209.html" class="card-link"><i>Bolt</i></a> now."#
        );

        let out = rewrite_card_links(&auto_link("Unknown", "<b>who</b>\nknows"), &names());
        assert_eq!(out, "<b>who</b>\nknows");
    }

    #[test]
    fn empty_label_falls_back_to_card_name() {
        let out = rewrite_card_links(&auto_link("Lightning%20Bolt", ""), &names());
        assert_eq!(out, r#"<a href="../cards/209.html" class="card-link">Lightning Bolt</a>"#);

        let out = rewrite_card_links(&auto_link("Unknown%20Card", ""), &names());
        assert_eq!(out, "Unknown Card");
        assert!(!out.contains("Details.aspx"));
    }

    #[test]
    fn other_anchors_are_left_alone() {
        let text = r#"<a href="https://example.com">elsewhere</a>"#;
        assert_eq!(rewrite_card_links(text, &names()), text);
    }

    #[test]
    fn name_map_lookup_is_case_insensitive() {
        let map = names();
        assert_eq!(map.get("lightning bolt"), Some(209));
        assert_eq!(map.get("LIGHTNING BOLT"), Some(209));
        assert_eq!(map.get("Shock"), None);
        assert_eq!(map.len(), 2);
    }
}
