//! The in-memory card catalog.
//!
//! A [`Catalog`] owns every loaded [`Printing`] plus the grouping index that
//! maps oracle identifiers (one per unique card) to the printings of that
//! card. Building it happens in three strictly ordered steps:
//!
//! ```text
//! 1. load(source)            once per source; merges repeated printings
//! 2. rewrite_all_links()     after every source is loaded
//! 3. build_grouping_index()  groups printings by oracle id, oldest first
//! ```
//!
//! ## Merging
//!
//! The same printing can show up in more than one archive file. The first
//! occurrence creates the printing and copies its cached metadata; later
//! occurrences only contribute comments, which are appended and re-sorted by
//! timestamp. Nothing else on the printing is ever overwritten.
//!
//! ## Grouping
//!
//! Each group is ordered by release date ascending. Printings without a date
//! go last, keeping ascending identifier order among themselves. Printings
//! without an oracle identifier are not grouped at all.

use crate::ingest::{CardSource, IngestError};
use crate::links::{NameMap, rewrite_card_links};
use crate::types::{CardMetadata, Comment, Printing, PrintingId};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub struct Catalog {
    printings: BTreeMap<PrintingId, Printing>,
    groups: BTreeMap<String, Vec<PrintingId>>,
    names: NameMap,
    metadata: HashMap<PrintingId, CardMetadata>,
}

/// Counters reported after loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub entries: usize,
    pub new_printings: usize,
    pub merged: usize,
    pub comments: usize,
}

impl Catalog {
    pub fn new(names: NameMap, metadata: HashMap<PrintingId, CardMetadata>) -> Self {
        Self {
            names,
            metadata,
            ..Default::default()
        }
    }

    /// Load every entry of `source` into the catalog.
    pub fn load(&mut self, source: &dyn CardSource) -> Result<LoadStats, IngestError> {
        let mut stats = LoadStats::default();
        for entry in source.entries()? {
            stats.entries += 1;
            stats.comments += entry.comments.len();
            let comments = entry.comments.into_iter().map(Comment::from);

            match self.printings.get_mut(&entry.id) {
                Some(existing) => {
                    existing.extend_comments(comments);
                    stats.merged += 1;
                }
                None => {
                    let mut printing = Printing::new(entry.id, entry.name);
                    if let Some(meta) = self.metadata.get(&entry.id) {
                        printing.apply_metadata(meta);
                        match (meta.oracle_id.as_deref(), &printing.oracle_id) {
                            (Some(bad), None) if !bad.is_empty() => {
                                tracing::warn!(name = %printing.name, id = entry.id, oracle_id = %bad, "Ignoring invalid oracle id");
                            }
                            _ => {}
                        }
                    }
                    printing.extend_comments(comments);
                    self.printings.insert(entry.id, printing);
                    stats.new_printings += 1;
                }
            }
        }
        tracing::info!(
            entries = stats.entries,
            new = stats.new_printings,
            merged = stats.merged,
            "Loaded card data"
        );
        Ok(stats)
    }

    /// Rewrite cross-reference links in every comment body.
    pub fn rewrite_all_links(&mut self) {
        tracing::info!("Processing card links in comments");
        let names = &self.names;
        for printing in self.printings.values_mut() {
            for comment in printing.comments_mut() {
                comment.text = rewrite_card_links(&comment.text, names);
            }
        }
    }

    /// Group printings by oracle id, each group sorted by release date.
    pub fn build_grouping_index(&mut self) {
        self.groups.clear();
        for (id, printing) in &self.printings {
            if let Some(oracle_id) = &printing.oracle_id {
                self.groups.entry(oracle_id.clone()).or_default().push(*id);
            }
        }

        let printings = &self.printings;
        for ids in self.groups.values_mut() {
            ids.sort_by(|a, b| printings[a].release_key().cmp(&printings[b].release_key()));
        }

        tracing::info!(
            printings = self.printings.len(),
            unique = self.groups.len(),
            "Grouped printings into unique cards"
        );
    }

    /// All other printings of the same card, in group order.
    pub fn other_printings(&self, printing: &Printing) -> Vec<&Printing> {
        let Some(oracle_id) = &printing.oracle_id else {
            return Vec::new();
        };
        self.group(oracle_id)
            .iter()
            .filter(|id| **id != printing.id)
            .filter_map(|id| self.printings.get(id))
            .collect()
    }

    pub fn printing(&self, id: PrintingId) -> Option<&Printing> {
        self.printings.get(&id)
    }

    pub fn printing_mut(&mut self, id: PrintingId) -> Option<&mut Printing> {
        self.printings.get_mut(&id)
    }

    /// All printings, ascending by identifier.
    pub fn printings(&self) -> impl Iterator<Item = &Printing> {
        self.printings.values()
    }

    pub fn ids(&self) -> Vec<PrintingId> {
        self.printings.keys().copied().collect()
    }

    /// Printing identifiers of one group, oldest first. Empty if unknown.
    pub fn group(&self, oracle_id: &str) -> &[PrintingId] {
        self.groups.get(oracle_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The printings of one group, oldest first.
    pub fn group_printings(&self, oracle_id: &str) -> Vec<&Printing> {
        self.group(oracle_id)
            .iter()
            .filter_map(|id| self.printings.get(id))
            .collect()
    }

    /// All groups, ascending by oracle id.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[PrintingId])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.printings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.printings.is_empty()
    }

    /// Number of unique cards (groups).
    pub fn unique_len(&self) -> usize {
        self.groups.len()
    }

    pub fn comment_count(&self) -> usize {
        self.printings.values().map(|p| p.comments().len()).sum()
    }

    pub fn names(&self) -> &NameMap {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn comments_sorted_after_every_load() {
        let mut catalog = Catalog::default();
        catalog
            .load(&vec![entry(1, "Shock", &[("2009-01-01", "late"), ("2007-01-01", "early")])])
            .unwrap();
        assert_eq!(comment_texts(&catalog, 1), vec!["early", "late"]);

        catalog
            .load(&vec![entry(1, "Shock", &[("2008-01-01", "middle")])])
            .unwrap();
        assert_eq!(comment_texts(&catalog, 1), vec!["early", "middle", "late"]);
    }

    #[test]
    fn repeated_printing_unions_comments_and_keeps_first_fields() {
        let mut catalog = Catalog::new(NameMap::new(), metadata(&[(1, "o-1", Some("2001-01-01"))]));
        let stats = catalog
            .load(&vec![
                entry(1, "Shock", &[("2008-01-01", "a")]),
                entry(1, "Renamed Shock", &[("2008-01-02", "b")]),
            ])
            .unwrap();

        assert_eq!(stats.new_printings, 1);
        assert_eq!(stats.merged, 1);
        let p = catalog.printing(1).unwrap();
        assert_eq!(p.name, "Shock");
        assert_eq!(p.oracle_id.as_deref(), Some("o-1"));
        assert_eq!(p.released_at.as_deref(), Some("2001-01-01"));
        assert_eq!(comment_texts(&catalog, 1), vec!["a", "b"]);
    }

    #[test]
    fn merged_comments_are_rewritten() {
        let names: NameMap = [("Shock".to_string(), 1)].into_iter().collect();
        let mut catalog = Catalog::new(names, HashMap::new());
        catalog.load(&vec![entry(2, "Bolt", &[("2008", "x")])]).unwrap();
        catalog
            .load(&vec![entry(2, "Bolt", &[("2009", auto_link("Shock").as_str())])])
            .unwrap();
        catalog.rewrite_all_links();

        let texts = comment_texts(&catalog, 2);
        assert!(texts[1].contains(r#"href="../cards/1.html""#));
    }

    #[test]
    fn groups_sorted_by_release_date_missing_last() {
        let mut catalog = Catalog::new(
            NameMap::new(),
            metadata(&[
                (10, "o-1", None),
                (11, "o-1", Some("2010-01-01")),
                (12, "o-1", Some("1993-08-05")),
                (13, "o-2", Some("2000-01-01")),
            ]),
        );
        catalog
            .load(&vec![
                entry(10, "Card", &[]),
                entry(11, "Card", &[]),
                entry(12, "Card", &[]),
                entry(13, "Other", &[]),
                entry(14, "Loner", &[]),
            ])
            .unwrap();
        catalog.build_grouping_index();

        assert_eq!(catalog.group("o-1"), &[12, 11, 10]);
        assert_eq!(catalog.group("o-2"), &[13]);
        assert_eq!(catalog.unique_len(), 2);

        let grouped: usize = catalog.groups().map(|(_, ids)| ids.len()).sum();
        assert_eq!(grouped, 4);
        assert!(catalog.groups().all(|(_, ids)| !ids.contains(&14)));
    }

    #[test]
    fn other_printings_excludes_self_in_group_order() {
        let mut catalog = Catalog::new(
            NameMap::new(),
            metadata(&[
                (1, "o-1", Some("2003-01-01")),
                (2, "o-1", Some("2001-01-01")),
                (3, "o-1", Some("2002-01-01")),
            ]),
        );
        catalog
            .load(&vec![entry(1, "C", &[]), entry(2, "C", &[]), entry(3, "C", &[])])
            .unwrap();
        catalog.build_grouping_index();

        let p = catalog.printing(3).unwrap();
        let others: Vec<PrintingId> = catalog.other_printings(p).iter().map(|p| p.id).collect();
        assert_eq!(others, vec![2, 1]);
    }

    #[test]
    fn ungrouped_printing_has_no_other_printings() {
        let mut catalog = Catalog::default();
        catalog.load(&vec![entry(5, "Loner", &[])]).unwrap();
        catalog.build_grouping_index();

        let p = catalog.printing(5).unwrap();
        assert!(catalog.other_printings(p).is_empty());
        assert_eq!(catalog.unique_len(), 0);
    }

    #[test]
    fn rebuilding_index_is_idempotent() {
        let mut catalog = Catalog::new(NameMap::new(), metadata(&[(1, "o", None), (2, "o", None)]));
        catalog.load(&vec![entry(1, "C", &[]), entry(2, "C", &[])]).unwrap();
        catalog.build_grouping_index();
        catalog.build_grouping_index();
        assert_eq!(catalog.group("o"), &[1, 2]);
    }

    #[test]
    fn invalid_oracle_id_leaves_printing_ungrouped() {
        let mut catalog = Catalog::new(
            NameMap::new(),
            metadata(&[(1, "../../etc", None), (2, "o-ok", None)]),
        );
        catalog
            .load(&vec![entry(1, "Bolt", &[]), entry(2, "Shock", &[])])
            .unwrap();
        catalog.build_grouping_index();

        assert_eq!(catalog.printing(1).unwrap().oracle_id, None);
        assert_eq!(catalog.groups().count(), 1);
        assert_eq!(catalog.group("o-ok"), &[2]);
    }

    #[test]
    fn unknown_group_is_empty() {
        let catalog = Catalog::default();
        assert!(catalog.group("missing").is_empty());
        assert!(catalog.group_printings("missing").is_empty());
    }
}
