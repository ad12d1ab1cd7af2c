//! Page discovery, output paths and navigation.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use demoblock_mdx::{parse_mdx, ParsedDoc};

use crate::builder::BuildError;
use crate::templates::{NavItem, TocEntry};

/// A discovered page.
#[derive(Debug, Clone)]
pub struct Page {
    /// Source file path
    pub source_path: PathBuf,

    /// Relative path from docs dir
    pub relative_path: PathBuf,

    /// URL path, always ending with `/`
    pub url: String,

    /// Parsed document
    pub doc: ParsedDoc,
}

impl Page {
    /// Read and parse one page.
    pub fn load(docs_dir: &Path, path: &Path, base_url: &str) -> Result<Self, BuildError> {
        let content = fs::read_to_string(path)
            .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

        let doc = parse_mdx(&content).map_err(|e| BuildError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let relative_path = path.strip_prefix(docs_dir).unwrap_or(path).to_path_buf();
        let slug = doc.frontmatter.as_ref().and_then(|f| f.slug.as_deref());
        let url = page_url(&relative_path, slug, base_url);

        Ok(Self {
            source_path: path.to_path_buf(),
            relative_path,
            url,
            doc,
        })
    }

    /// Page title: frontmatter, first heading, then the file stem.
    pub fn title(&self) -> String {
        self.doc.title().map(str::to_string).unwrap_or_else(|| {
            self.relative_path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(capitalize)
                .unwrap_or_else(|| "Untitled".to_string())
        })
    }

    pub fn order(&self) -> i32 {
        self.doc
            .frontmatter
            .as_ref()
            .and_then(|f| f.order)
            .unwrap_or(999)
    }

    pub fn in_nav(&self) -> bool {
        self.doc.frontmatter.as_ref().map_or(true, |f| f.in_nav())
    }

    /// Output file for this page under `output_dir`.
    pub fn output_path(&self, output_dir: &Path, base_url: &str) -> PathBuf {
        let relative = self.url.strip_prefix(base_url).unwrap_or(&self.url);
        relative
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(output_dir.to_path_buf(), |path, segment| path.join(segment))
            .join("index.html")
    }

    pub fn toc(&self) -> Vec<TocEntry> {
        self.doc
            .toc
            .iter()
            .map(|e| TocEntry {
                title: e.title.clone(),
                id: e.id.clone(),
                level: e.level,
            })
            .collect()
    }
}

/// Whether a file is a page source.
pub fn is_page_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("mdx")
    )
}

/// Discover and parse all pages, sorted by frontmatter order then path.
pub fn discover_pages(docs_dir: &Path, base_url: &str) -> Result<Vec<Page>, BuildError> {
    if !docs_dir.exists() {
        return Err(BuildError::ReadError(format!(
            "Docs directory not found: {}",
            docs_dir.display()
        )));
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(docs_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && is_page_file(path) {
            pages.push(Page::load(docs_dir, path, base_url)?);
        }
    }

    pages.sort_by(|a, b| {
        a.order()
            .cmp(&b.order())
            .then_with(|| a.relative_path.cmp(&b.relative_path))
    });

    Ok(pages)
}

/// URL of a page: `index.md` maps to its directory, others to `stem/`.
pub fn page_url(relative: &Path, slug: Option<&str>, base_url: &str) -> String {
    let path = match slug {
        Some(slug) => slug.trim_matches('/').to_string(),
        None => {
            let stem = relative
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("index");
            let parent = relative.parent().unwrap_or(Path::new(""));
            let parent = parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");

            match (parent.is_empty(), stem == "index") {
                (true, true) => String::new(),
                (true, false) => stem.to_string(),
                (false, true) => parent,
                (false, false) => format!("{}/{}", parent, stem),
            }
        }
    };

    if path.is_empty() {
        base_url.to_string()
    } else {
        format!("{}{}/", base_url, path)
    }
}

/// Build navigation: root pages first, then one section per directory.
pub fn build_navigation(pages: &[Page], base_url: &str) -> Vec<NavItem> {
    let mut nav = Vec::new();
    let mut dirs: BTreeMap<PathBuf, Vec<NavItem>> = BTreeMap::new();

    for page in pages.iter().filter(|p| p.in_nav()) {
        let item = NavItem {
            title: page.title(),
            path: page.url.clone(),
            children: Vec::new(),
        };

        let parent = page.relative_path.parent().unwrap_or(Path::new(""));
        if parent.as_os_str().is_empty() {
            nav.push(item);
        } else {
            dirs.entry(parent.to_path_buf()).or_default().push(item);
        }
    }

    for (dir, items) in dirs {
        let dir_name = dir
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("Section");

        nav.push(NavItem {
            title: capitalize(dir_name),
            path: format!("{}{}/", base_url, dir.to_string_lossy().replace('\\', "/")),
            children: items,
        });
    }

    nav
}

/// Capitalize first letter of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn computes_page_urls() {
        assert_eq!(page_url(Path::new("index.md"), None, "/"), "/");
        assert_eq!(page_url(Path::new("counter.mdx"), None, "/"), "/counter/");
        assert_eq!(page_url(Path::new("vue/index.md"), None, "/docs/"), "/docs/vue/");
        assert_eq!(page_url(Path::new("vue/todo.md"), None, "/"), "/vue/todo/");
        assert_eq!(page_url(Path::new("a.md"), Some("/custom/"), "/"), "/custom/");
    }

    #[test]
    fn discovers_and_orders_pages() {
        let temp = tempdir().unwrap();
        let docs = temp.path();
        fs::create_dir_all(docs.join("react")).unwrap();
        fs::write(docs.join("index.md"), "---\ntitle: Home\norder: 1\n---\n# Home\n").unwrap();
        fs::write(docs.join("zeta.md"), "---\norder: 0\n---\n# Zeta\n").unwrap();
        fs::write(docs.join("react/hooks.mdx"), "# Hooks\n").unwrap();
        fs::write(docs.join("hidden.md"), "---\nnav: false\n---\n# Hidden\n").unwrap();
        fs::write(docs.join("notes.txt"), "ignored").unwrap();

        let pages = discover_pages(docs, "/").unwrap();
        let titles: Vec<_> = pages.iter().map(|p| p.title()).collect();
        assert_eq!(titles, vec!["Zeta", "Home", "Hidden", "Hooks"]);

        let nav = build_navigation(&pages, "/");
        assert_eq!(nav.len(), 3);
        assert_eq!(nav[2].title, "React");
        assert_eq!(nav[2].children[0].path, "/react/hooks/");

        let out = pages[3].output_path(Path::new("dist"), "/");
        assert_eq!(out, Path::new("dist").join("react").join("hooks").join("index.html"));
    }

    #[test]
    fn missing_docs_dir_is_an_error() {
        let temp = tempdir().unwrap();
        assert!(matches!(
            discover_pages(&temp.path().join("nope"), "/"),
            Err(BuildError::ReadError(_))
        ));
    }
}
