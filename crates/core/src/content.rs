//! Markdown blog posts and static pages.
//!
//! Content lives in two directories under the content root:
//!
//! ```text
//! content/
//!   pages/nosotros.md          -> /pages/nosotros
//!   blog/2025-03-01-huerta.md  -> /blog/huerta
//! ```
//!
//! Each file starts with YAML front matter. Everything is loaded once at
//! startup and held in memory; a file that fails to parse is logged and
//! skipped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use regex::Regex;
use serde::Deserialize;

/// Words per minute used for the reading-time estimate.
const WORDS_PER_MINUTE: usize = 200;

static DATE_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}-").expect("Invalid regex"));

/// Errors loading content from disk.
#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid front matter in {path}: {message}")]
    FrontMatter { path: PathBuf, message: String },

    #[error("missing front matter in {0}")]
    MissingFrontMatter(PathBuf),
}

/// Front matter of a static page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// Front matter of a blog post.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub published_at: NaiveDate,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
}

/// A rendered static page.
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub html: String,
}

/// A rendered blog post.
#[derive(Debug, Clone)]
pub struct Post {
    pub slug: String,
    pub meta: PostMeta,
    pub html: String,
    pub reading_minutes: u32,
}

/// All pages and posts, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
    /// Newest first, drafts included.
    posts: Arc<Vec<Post>>,
}

impl ContentStore {
    /// Load `pages/` and `blog/` under `root`. Missing directories are empty.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Io`] if a directory exists but cannot be read.
    pub fn load(root: &Path) -> Result<Self, ContentError> {
        let pages = load_dir(&root.join("pages"), load_page)?
            .into_iter()
            .map(|page| (page.slug.clone(), page))
            .collect();

        let mut posts = load_dir(&root.join("blog"), load_post)?;
        posts.sort_by(|a, b| b.meta.published_at.cmp(&a.meta.published_at));

        Ok(Self {
            pages: Arc::new(pages),
            posts: Arc::new(posts),
        })
    }

    #[must_use]
    pub fn page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    /// Every page, sorted by title.
    #[must_use]
    pub fn pages(&self) -> Vec<&Page> {
        let mut pages: Vec<&Page> = self.pages.values().collect();
        pages.sort_by(|a, b| a.meta.title.cmp(&b.meta.title));
        pages
    }

    /// A published post by slug. Drafts are not served.
    #[must_use]
    pub fn published_post(&self, slug: &str) -> Option<&Post> {
        self.posts
            .iter()
            .find(|post| post.slug == slug && !post.meta.draft)
    }

    /// Published posts, newest first.
    pub fn published_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|post| !post.meta.draft)
    }

    /// Every post including drafts, newest first.
    #[must_use]
    pub fn all_posts(&self) -> &[Post] {
        &self.posts
    }

    /// Up to `limit` published posts other than `exclude`.
    #[must_use]
    pub fn recent_posts(&self, limit: usize, exclude: Option<&str>) -> Vec<&Post> {
        self.published_posts()
            .filter(|post| exclude.is_none_or(|slug| post.slug != slug))
            .take(limit)
            .collect()
    }
}

fn load_dir<T>(
    dir: &Path,
    load: fn(&Path) -> Result<T, ContentError>,
) -> Result<Vec<T>, ContentError> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "Content directory does not exist");
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| ContentError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut items = Vec::new();
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        match load(&path) {
            Ok(item) => items.push(item),
            Err(e) => tracing::error!(path = %path.display(), error = %e, "Skipping content file"),
        }
    }
    tracing::info!(dir = %dir.display(), count = items.len(), "Loaded content");
    Ok(items)
}

fn read_with_front_matter<M: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<(M, String), ContentError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ParsedEntity<M> =
        Matter::<YAML>::new()
            .parse(&raw)
            .map_err(|e| ContentError::FrontMatter {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::MissingFrontMatter(path.to_path_buf()))?;
    Ok((meta, parsed.content))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}

fn load_page(path: &Path) -> Result<Page, ContentError> {
    let (meta, body) = read_with_front_matter::<PageMeta>(path)?;
    Ok(Page {
        slug: file_stem(path),
        meta,
        html: render_markdown(&body),
    })
}

fn load_post(path: &Path) -> Result<Post, ContentError> {
    let (meta, body) = read_with_front_matter::<PostMeta>(path)?;
    Ok(Post {
        slug: post_slug(&file_stem(path)),
        meta,
        html: render_markdown(&body),
        reading_minutes: reading_minutes(&body),
    })
}

/// `2025-03-01-huerta-en-casa` -> `huerta-en-casa`.
fn post_slug(stem: &str) -> String {
    DATE_PREFIX_RE.replace(stem, "").into_owned()
}

fn reading_minutes(body: &str) -> u32 {
    let words = body.split_whitespace().count();
    u32::try_from(words.div_ceil(WORDS_PER_MINUTE))
        .unwrap_or(u32::MAX)
        .max(1)
}

/// GitHub-flavored markdown. Raw HTML in the source is escaped.
fn render_markdown(markdown: &str) -> String {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.header_ids = Some(String::new());
    markdown_to_html(markdown, &options)
}
