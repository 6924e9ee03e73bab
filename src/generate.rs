//! HTML site generation.
//!
//! Takes the catalog built from the archive and writes the static site. The
//! full build runs in a fixed order, and no phase starts before the previous
//! one has finished for every printing:
//!
//! ```text
//! 1. load sources           ─┐
//! 2. rewrite comment links   ├─ load_catalog
//! 3. build grouping index   ─┘
//! 4. printing pages          cards/<id>.html         (copies images)
//! 5. combined pages          cards/combined/<oracle_id>.html
//! 6. index page              index.html
//! 7. sitemap                 sitemap.xml
//! 8. static assets           static/
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── sitemap.xml
//! ├── cards/
//! │   ├── 209.html
//! │   └── combined/
//! │       └── 4457ed35-7c10-48c8-9776-456485fdf070.html
//! ├── images/
//! │   └── 209.webp
//! └── static/
//!     ├── style.css
//!     └── search.js
//! ```
//!
//! ## Relative links
//!
//! Comment bodies link to other printings as `../cards/<id>.html`, which is
//! correct from `cards/`. Combined pages live one level deeper, so they carry
//! `<base href="../">` and write every other link relative to `cards/` too.
//!
//! ## Failure isolation
//!
//! A page that fails to render or write is logged with its name and
//! identifier, recorded in the [`RunReport`], and skipped. Pages are written
//! to a temporary file and renamed into place, so a failed page leaves no
//! partial file behind.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Comment bodies are archived HTML and are inserted pre-escaped; everything
//! else is auto-escaped.

use crate::catalog::{Catalog, LoadStats};
use crate::config::SiteConfig;
use crate::images;
use crate::index::{self, CardIndex, OTHER_BUCKET};
use crate::ingest::{self, IngestError, JsonDataDir};
use crate::types::{Comment, Printing, PrintingId, is_valid_oracle_id};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::instrument;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),
    #[error("Card with identifier {0} not found in data")]
    PrintingNotFound(PrintingId),
    #[error("Oracle id {0:?} cannot be used as a file name")]
    InvalidOracleId(String),
    #[error("Failed to copy assets: {0}")]
    Assets(#[from] walkdir::Error),
}

const CSS: &str = include_str!("../static/style.css");
const SEARCH_JS: &str = include_str!("../static/search.js");

/// Log progress every this many printing pages.
const PRINTING_PROGRESS_EVERY: usize = 10;
/// Log progress every this many combined pages.
const COMBINED_PROGRESS_EVERY: usize = 100;

/// What happened to a printing's image while rendering its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStatus {
    AlreadyResolved,
    Copied,
    Missing,
    CopyFailed,
}

/// A successfully written printing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub path: PathBuf,
    pub image: ImageStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Printing,
    Combined,
}

/// A page that could not be generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    pub kind: PageKind,
    /// Printing identifier or oracle identifier.
    pub key: String,
    pub name: String,
    pub reason: String,
}

/// Summary of a full build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub load: LoadStats,
    pub printings: usize,
    pub unique_cards: usize,
    pub printing_pages: usize,
    pub combined_pages: usize,
    pub images_copied: usize,
    pub images_missing: usize,
    pub failures: Vec<PageFailure>,
    pub output_dir: PathBuf,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Phases 1-3: load every source, rewrite links, group printings.
pub fn load_catalog(config: &SiteConfig) -> Result<(Catalog, LoadStats), GenerateError> {
    let names = ingest::load_name_map(&config.name_map);
    let metadata = ingest::load_metadata(&config.metadata);
    tracing::info!(names = names.len(), metadata = metadata.len(), "Loaded caches");

    let mut catalog = Catalog::new(names, metadata);
    let stats = catalog.load(&JsonDataDir::new(&config.data_dir))?;
    catalog.rewrite_all_links();
    catalog.build_grouping_index();
    Ok((catalog, stats))
}

/// Writes pages for an already built catalog.
#[derive(Debug, Clone)]
pub struct SiteGenerator {
    output_dir: PathBuf,
    images_dir: PathBuf,
    site_title: String,
    base_url: String,
    assets_dir: Option<PathBuf>,
}

impl SiteGenerator {
    pub fn new(config: &SiteConfig) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            images_dir: config.images_dir.clone(),
            site_title: config.site_title.clone(),
            base_url: config.base_url.clone(),
            assets_dir: config.assets_dir.clone(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Copy the printing's image into the output tree unless already done.
    fn resolve_image(&self, printing: &mut Printing) -> ImageStatus {
        if printing.image_path.is_some() {
            return ImageStatus::AlreadyResolved;
        }
        let Some(source) = images::find_card_image(&self.images_dir, printing.id) else {
            tracing::warn!(name = %printing.name, id = printing.id, "No image found");
            return ImageStatus::Missing;
        };
        match images::copy_card_image(&source, &self.output_dir) {
            Ok(rel) => {
                printing.image_path = Some(rel);
                ImageStatus::Copied
            }
            Err(e) => {
                tracing::error!(name = %printing.name, id = printing.id, error = %e, "Failed to copy image");
                ImageStatus::CopyFailed
            }
        }
    }

    /// Render `cards/<id>.html`.
    #[instrument(skip(self, catalog))]
    pub fn render_printing_page(
        &self,
        catalog: &mut Catalog,
        id: PrintingId,
    ) -> Result<RenderedPage, GenerateError> {
        let printing = catalog
            .printing_mut(id)
            .ok_or(GenerateError::PrintingNotFound(id))?;
        let image = self.resolve_image(printing);

        let printing = catalog
            .printing(id)
            .ok_or(GenerateError::PrintingNotFound(id))?;
        tracing::debug!(name = %printing.name, "Generating printing page");

        let others = catalog.other_printings(printing);
        let combined_link = match &printing.oracle_id {
            Some(oracle_id) if !others.is_empty() => Some(combined_href(oracle_id)),
            _ => None,
        };
        let total_comments = printing.comments().len()
            + others.iter().map(|p| p.comments().len()).sum::<usize>();

        let markup = render_printing(
            printing,
            &others,
            combined_link.as_deref(),
            total_comments,
            &self.site_title,
        );
        let path = self.output_dir.join("cards").join(format!("{}.html", id));
        write_page(&path, markup)?;
        Ok(RenderedPage { path, image })
    }

    /// Render `cards/combined/<oracle_id>.html`. `Ok(None)` for an empty group.
    pub fn render_combined_page(
        &self,
        catalog: &Catalog,
        oracle_id: &str,
    ) -> Result<Option<PathBuf>, GenerateError> {
        if !is_valid_oracle_id(oracle_id) {
            return Err(GenerateError::InvalidOracleId(oracle_id.to_string()));
        }
        let printings = catalog.group_printings(oracle_id);
        let Some(first) = printings.first() else {
            return Ok(None);
        };
        let total_comments: usize = printings.iter().map(|p| p.comments().len()).sum();
        tracing::debug!(
            name = %first.name,
            printings = printings.len(),
            comments = total_comments,
            "Generating combined page"
        );

        let markup = render_combined(&first.name, &printings, total_comments, &self.site_title);
        let path = self
            .output_dir
            .join("cards")
            .join("combined")
            .join(format!("{}.html", oracle_id));
        write_page(&path, markup)?;
        Ok(Some(path))
    }

    /// Render `index.html`.
    pub fn write_index(&self, catalog: &Catalog) -> Result<CardIndex, GenerateError> {
        let card_index = index::build_index(catalog);
        let markup = render_index(&card_index, &self.site_title);
        write_page(&self.output_dir.join("index.html"), markup)?;
        Ok(card_index)
    }

    /// Render `sitemap.xml`.
    pub fn write_sitemap(&self, catalog: &Catalog) -> Result<usize, GenerateError> {
        let entries = index::build_sitemap(catalog, &self.base_url);
        fs::create_dir_all(&self.output_dir)?;
        fs::write(
            self.output_dir.join("sitemap.xml"),
            index::render_sitemap(&entries),
        )?;
        Ok(entries.len())
    }

    /// Write embedded assets to `static/`, then copy the user's assets over them.
    pub fn copy_static_files(&self) -> Result<(), GenerateError> {
        let static_dir = self.output_dir.join("static");
        fs::create_dir_all(&static_dir)?;
        fs::write(static_dir.join("style.css"), CSS)?;
        fs::write(static_dir.join("search.js"), SEARCH_JS)?;

        if let Some(assets) = &self.assets_dir {
            if assets.is_dir() {
                copy_dir_recursive(assets, &static_dir)?;
            } else {
                tracing::warn!(path = %assets.display(), "Assets directory not found");
            }
        }
        Ok(())
    }

    /// Phases 4-8 over a fully built catalog.
    pub fn generate_all(&self, catalog: &mut Catalog) -> Result<RunReport, GenerateError> {
        fs::create_dir_all(&self.output_dir)?;
        let mut report = RunReport {
            printings: catalog.len(),
            unique_cards: catalog.unique_len(),
            output_dir: self.output_dir.clone(),
            ..Default::default()
        };

        let ids = catalog.ids();
        let total = ids.len();
        tracing::info!(total, "Generating printing pages");
        for (i, id) in ids.into_iter().enumerate() {
            match self.render_printing_page(catalog, id) {
                Ok(page) => {
                    report.printing_pages += 1;
                    match page.image {
                        ImageStatus::Copied => report.images_copied += 1,
                        ImageStatus::Missing | ImageStatus::CopyFailed => {
                            report.images_missing += 1
                        }
                        ImageStatus::AlreadyResolved => {}
                    }
                }
                Err(e) => {
                    let name = catalog.printing(id).map(|p| p.name.clone()).unwrap_or_default();
                    tracing::error!(name = %name, id, error = %e, "Error generating printing page");
                    report.failures.push(PageFailure {
                        kind: PageKind::Printing,
                        key: id.to_string(),
                        name,
                        reason: e.to_string(),
                    });
                }
            }
            let done = i + 1;
            if done % PRINTING_PROGRESS_EVERY == 0 || done == total {
                tracing::info!("Generated {}/{} printing pages", done, total);
            }
        }

        let oracle_ids: Vec<String> = catalog.groups().map(|(o, _)| o.to_string()).collect();
        let combined_total = oracle_ids.len();
        tracing::info!(total = combined_total, "Generating combined pages");
        for (i, oracle_id) in oracle_ids.iter().enumerate() {
            match self.render_combined_page(catalog, oracle_id) {
                Ok(Some(_)) => report.combined_pages += 1,
                Ok(None) => {}
                Err(e) => {
                    let name = catalog
                        .group_printings(oracle_id)
                        .first()
                        .map(|p| p.name.clone())
                        .unwrap_or_default();
                    tracing::error!(name = %name, oracle_id = %oracle_id, error = %e, "Error generating combined page");
                    report.failures.push(PageFailure {
                        kind: PageKind::Combined,
                        key: oracle_id.clone(),
                        name,
                        reason: e.to_string(),
                    });
                }
            }
            if (i + 1) % COMBINED_PROGRESS_EVERY == 0 {
                tracing::info!("Generated {}/{} combined pages", i + 1, combined_total);
            }
        }

        self.write_index(catalog)?;
        self.write_sitemap(catalog)?;
        self.copy_static_files()?;

        tracing::info!(output = %self.output_dir.display(), "Site generation complete");
        Ok(report)
    }
}

/// Build the whole site described by `config`.
pub fn build_site(config: &SiteConfig) -> Result<RunReport, GenerateError> {
    let (mut catalog, load) = load_catalog(config)?;
    let generator = SiteGenerator::new(config);
    if catalog.is_empty() {
        tracing::info!("No cards found in data directory");
        return Ok(RunReport {
            load,
            output_dir: config.output_dir.clone(),
            ..Default::default()
        });
    }
    let mut report = generator.generate_all(&mut catalog)?;
    report.load = load;
    Ok(report)
}

/// Build a single printing page plus static assets.
pub fn build_single(config: &SiteConfig, id: PrintingId) -> Result<RenderedPage, GenerateError> {
    let (mut catalog, _) = load_catalog(config)?;
    if catalog.printing(id).is_none() {
        return Err(GenerateError::PrintingNotFound(id));
    }
    let generator = SiteGenerator::new(config);
    fs::create_dir_all(generator.output_dir())?;
    let page = generator.render_printing_page(&mut catalog, id)?;
    generator.copy_static_files()?;
    tracing::info!(path = %page.path.display(), "Generated printing page");
    Ok(page)
}

/// Write a page via a temporary file so failures leave nothing behind.
fn write_page(path: &Path, markup: Markup) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("html.tmp");
    let result = fs::write(&tmp, markup.into_string()).and_then(|_| fs::rename(&tmp, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), GenerateError> {
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn combined_href(oracle_id: &str) -> String {
    format!("combined/{}.html", oracle_id)
}

fn comment_count_label(n: usize) -> String {
    if n == 1 {
        "1 comment".to_string()
    } else {
        format!("{} comments", n)
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure.
///
/// `root` is the relative path from the page to the site root; `base` sets a
/// `<base href>` for pages whose links are written relative to another
/// directory.
fn base_document(title: &str, root: &str, base: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if let Some(href) = base {
                    base href=(href);
                }
                title { (title) }
                link rel="stylesheet" href={ (root) "static/style.css" };
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the site header with a breadcrumb back to the index.
fn site_header(root: &str, site_title: &str, current: Option<&str>) -> Markup {
    html! {
        header.site-header {
            nav.breadcrumb {
                a href={ (root) "index.html" } { (site_title) }
                @if let Some(current) = current {
                    " › "
                    (current)
                }
            }
        }
    }
}

fn render_comment(comment: &Comment) -> Markup {
    html! {
        article.comment {
            header.comment-meta {
                span.comment-author { (comment.author.as_deref().unwrap_or("Anonymous")) }
                time datetime=(comment.datetime) { (comment.datetime) }
                @if comment.is_rated() {
                    span.comment-rating title={ (comment.vote_count) " votes" } {
                        "★ " (format!("{:.1}", comment.star_rating))
                        " (" (comment.vote_count) ")"
                    }
                }
            }
            div.comment-body {
                (PreEscaped(&comment.text))
            }
        }
    }
}

fn render_comments(comments: &[Comment]) -> Markup {
    html! {
        @if comments.is_empty() {
            p.no-comments { "No comments archived for this printing." }
        } @else {
            @for comment in comments {
                (render_comment(comment))
            }
        }
    }
}

/// Image from the site root as seen from `cards/`.
fn render_card_image(printing: &Printing) -> Markup {
    html! {
        figure.card-image {
            @if let Some(path) = &printing.image_path {
                img src={ "../" (path) } alt=(printing.name) loading="lazy";
            } @else {
                div.card-image-missing { "No image available" }
            }
        }
    }
}

fn render_details(printing: &Printing) -> Markup {
    let rows = [
        ("Set", printing.set_name.as_deref()),
        ("Set code", printing.set_code.as_deref()),
        ("Collector number", printing.collector_number.as_deref()),
        ("Artist", printing.artist.as_deref()),
        ("Released", printing.released_at.as_deref()),
    ];
    html! {
        dl.card-details {
            @for (label, value) in rows {
                @if let Some(value) = value {
                    dt { (label) }
                    dd { (value) }
                }
            }
            dt { "Multiverse ID" }
            dd { (printing.id) }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders one printing's page. Lives in `cards/`.
fn render_printing(
    printing: &Printing,
    others: &[&Printing],
    combined_link: Option<&str>,
    total_comments: usize,
    site_title: &str,
) -> Markup {
    let content = html! {
        (site_header("../", site_title, Some(&printing.name)))
        main.card-page {
            (render_card_image(printing))
            section.card-info {
                h1 { (printing.name) }
                (render_details(printing))
                @if let Some(link) = combined_link {
                    a.combined-link href=(link) {
                        "View all " (comment_count_label(total_comments))
                        " across " (others.len() + 1) " printings"
                    }
                }
                @if !others.is_empty() {
                    section.other-printings {
                        h2 { "Other printings" }
                        ul {
                            @for other in others {
                                li {
                                    a href={ (other.id) ".html" } { (other.set_label()) }
                                    @if let Some(date) = &other.released_at {
                                        " " span.release-date { (date) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
            section.comments {
                h2 { "Comments (" (printing.comments().len()) ")" }
                (render_comments(printing.comments()))
            }
        }
    };
    base_document(&format!("{} - {}", printing.name, site_title), "../", None, content)
}

/// Renders the combined page for one card. Lives in `cards/combined/`, but
/// resolves links from `cards/` via `<base>`.
fn render_combined(
    card_name: &str,
    printings: &[&Printing],
    total_comments: usize,
    site_title: &str,
) -> Markup {
    let content = html! {
        (site_header("../", site_title, Some(card_name)))
        main.combined-page {
            header.combined-header {
                h1 { (card_name) }
                p.combined-summary {
                    (comment_count_label(total_comments))
                    " across " (printings.len())
                    @if printings.len() == 1 { " printing" } @else { " printings" }
                }
            }
            @for printing in printings {
                section.printing id={ "printing-" (printing.id) } {
                    h2 {
                        a href={ (printing.id) ".html" } { (printing.set_label()) }
                        @if let Some(date) = &printing.released_at {
                            " " span.release-date { (date) }
                        }
                    }
                    (render_card_image(printing))
                    (render_comments(printing.comments()))
                }
            }
        }
    };
    base_document(&format!("{} - {}", card_name, site_title), "../", Some("../"), content)
}

/// Renders the alphabetical index / search page. Lives at the site root.
fn render_index(card_index: &CardIndex, site_title: &str) -> Markup {
    let mut labels: Vec<String> = vec![OTHER_BUCKET.to_string()];
    labels.extend(card_index.alphabet().iter().map(|c| c.to_string()));

    let content = html! {
        (site_header("", site_title, None))
        main.index-page {
            h1 { (site_title) }
            p.index-summary { (card_index.card_count()) " cards" }
            input #card-search type="search" placeholder="Search cards…" autocomplete="off";
            nav.alphabet {
                @for label in &labels {
                    @if card_index.bucket(label).is_empty() {
                        span.letter.empty { (label) }
                    } @else {
                        a.letter href={ "#letter-" (label) } { (label) }
                    }
                }
            }
            @for label in &labels {
                @let cards = card_index.bucket(label);
                @if !cards.is_empty() {
                    section.letter-group id={ "letter-" (label) } {
                        h2 { (label) }
                        ul.card-list {
                            @for card in cards {
                                li.card-entry data-name=(card.name.to_lowercase()) {
                                    a href={ "cards/" (combined_href(&card.oracle_id)) } { (card.name) }
                                    span.card-stats {
                                        (comment_count_label(card.total_comments))
                                        @if card.avg_rating > 0.0 {
                                            " · ★ " (format!("{:.1}", card.avg_rating))
                                        }
                                        @if card.printings > 1 {
                                            " · " (card.printings) " printings"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        script src="static/search.js" {}
    };
    base_document(site_title, "", None, content)
}

// ============================================================================
// Tests
// ============================================================================
