//! Reference document loading.
//!
//! The document is read once at startup into a [`CorpusText`]. Extraction
//! failures never abort the pipeline on their own: [`read`] reports them as
//! [`CorpusLoad::Failed`], and a [`LoadFailurePolicy`] decides what the rest of
//! the service sees.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::error::CoreError;

/// Stands in for the corpus when the document could not be read.
pub const LOAD_FAILURE_SENTINEL: &str = "Error extracting text from PDF.";

// =============================================================================
// CorpusText
// =============================================================================

/// The extracted document text, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusText(String);

impl CorpusText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn sentinel() -> Self {
        Self(LOAD_FAILURE_SENTINEL.to_string())
    }

    /// Join page texts in order, one newline after each non-empty page, then trim.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for page in pages {
            let page = page.as_ref();
            if page.is_empty() {
                continue;
            }
            text.push_str(page);
            text.push('\n');
        }
        Self(text.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_sentinel(&self) -> bool {
        self.0 == LOAD_FAILURE_SENTINEL
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CorpusText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorpusText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// Document sources
// =============================================================================

/// Anything that can yield the text of a document, one entry per page.
pub trait DocumentSource: Send + Sync {
    /// Human-readable locator for logs.
    fn describe(&self) -> String;

    /// Extract each page's text in document order. Pages without text may be empty.
    fn page_texts(&self) -> Result<Vec<String>>;
}

/// A PDF on the local filesystem, parsed with `lopdf`.
#[derive(Debug, Clone)]
pub struct PdfSource {
    path: PathBuf,
}

impl PdfSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for PdfSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn page_texts(&self) -> Result<Vec<String>> {
        let document = lopdf::Document::load(&self.path)
            .with_context(|| format!("Cannot open PDF '{}'", self.path.display()))?;

        document
            .get_pages()
            .into_keys()
            .map(|page_number| {
                document
                    .extract_text(&[page_number])
                    .map(strip_page_breaks)
                    .with_context(|| format!("Cannot extract text from page {page_number}"))
            })
            .collect()
    }
}

/// `extract_text` ends every page with a line break; the join supplies its own.
fn strip_page_breaks(text: String) -> String {
    text.trim_end_matches(['\n', '\r']).to_string()
}

// =============================================================================
// Loading
// =============================================================================

/// Outcome of reading a document source.
#[derive(Debug)]
pub enum CorpusLoad {
    Loaded(CorpusText),
    Failed { cause: anyhow::Error },
}

/// Read every page of `source` into a [`CorpusLoad`]. Never returns an error.
pub fn read(source: &dyn DocumentSource) -> CorpusLoad {
    match source.page_texts() {
        Ok(pages) => {
            let page_count = pages.len();
            let corpus = CorpusText::from_pages(pages);
            if corpus.is_empty() {
                warn!(source = %source.describe(), pages = page_count, "Document contains no extractable text");
            } else {
                info!(
                    source = %source.describe(),
                    pages = page_count,
                    chars = corpus.len(),
                    "Loaded reference document"
                );
            }
            CorpusLoad::Loaded(corpus)
        }
        Err(cause) => {
            let detail = format!("{cause:#}");
            error!(source = %source.describe(), error = %detail, "Error reading document");
            CorpusLoad::Failed { cause }
        }
    }
}

/// What the service does with a document that failed to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadFailurePolicy {
    /// Serve requests against [`LOAD_FAILURE_SENTINEL`] as if it were the document.
    #[default]
    UseSentinelText,
    /// Refuse to start.
    FailStartup,
}

impl LoadFailurePolicy {
    pub fn resolve(self, load: CorpusLoad) -> Result<CorpusText, CoreError> {
        match (load, self) {
            (CorpusLoad::Loaded(corpus), _) => Ok(corpus),
            (CorpusLoad::Failed { .. }, LoadFailurePolicy::UseSentinelText) => {
                warn!("Continuing with sentinel corpus text");
                Ok(CorpusText::sentinel())
            }
            (CorpusLoad::Failed { cause }, LoadFailurePolicy::FailStartup) => {
                Err(CoreError::CorpusLoad(format!("{cause:#}")))
            }
        }
    }
}

impl FromStr for LoadFailurePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentinel" | "use-sentinel" => Ok(LoadFailurePolicy::UseSentinelText),
            "fail" | "fail-startup" => Ok(LoadFailurePolicy::FailStartup),
            other => Err(CoreError::Config(format!(
                "unknown corpus load failure policy {other:?} (expected \"sentinel\" or \"fail\")"
            ))),
        }
    }
}

/// Load `source` under `policy`.
pub fn load(source: &dyn DocumentSource, policy: LoadFailurePolicy) -> Result<CorpusText, CoreError> {
    policy.resolve(read(source))
}

/// Load `source`, substituting the sentinel text on any failure.
pub fn load_or_sentinel(source: &dyn DocumentSource) -> CorpusText {
    match read(source) {
        CorpusLoad::Loaded(corpus) => corpus,
        CorpusLoad::Failed { .. } => CorpusText::sentinel(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticSource;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use std::path::Path;

    #[test]
    fn pages_are_joined_in_order_and_trimmed() {
        let corpus = CorpusText::from_pages(["  Opioids are drugs.", "", "Naloxone reverses overdose.  "]);
        assert_eq!(corpus.as_str(), "Opioids are drugs.\nNaloxone reverses overdose.");
    }

    #[test]
    fn no_pages_gives_empty_text() {
        let corpus = CorpusText::from_pages(Vec::<String>::new());
        assert!(corpus.is_empty());
        assert!(!corpus.is_sentinel());
    }

    #[test]
    fn missing_pdf_falls_back_to_sentinel() {
        let source = PdfSource::new("/nonexistent/OpioidInfo.pdf");

        assert!(matches!(read(&source), CorpusLoad::Failed { .. }));
        let corpus = load_or_sentinel(&source);
        assert_eq!(corpus.as_str(), LOAD_FAILURE_SENTINEL);
        assert!(corpus.is_sentinel());
    }

    #[test]
    fn garbage_bytes_fall_back_to_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"definitely not a pdf").unwrap();

        let corpus = load(&PdfSource::new(&path), LoadFailurePolicy::UseSentinelText).unwrap();
        assert!(corpus.is_sentinel());
    }

    #[test]
    fn fail_startup_policy_surfaces_the_cause() {
        let source = StaticSource::failing("disk on fire");
        let err = load(&source, LoadFailurePolicy::FailStartup).unwrap_err();

        assert!(matches!(err, CoreError::CorpusLoad(_)));
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn policy_does_not_touch_loaded_text() {
        let source = StaticSource::pages(["Opioids are drugs..."]);
        let corpus = load(&source, LoadFailurePolicy::FailStartup).unwrap();
        assert_eq!(corpus.as_str(), "Opioids are drugs...");
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("sentinel".parse::<LoadFailurePolicy>().unwrap(), LoadFailurePolicy::UseSentinelText);
        assert_eq!(" FAIL ".parse::<LoadFailurePolicy>().unwrap(), LoadFailurePolicy::FailStartup);
        assert!("retry".parse::<LoadFailurePolicy>().is_err());
    }

    fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn pdf_pages_are_extracted_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OpioidInfo.pdf");
        write_pdf(&path, &["Opioids are drugs", "Naloxone reverses overdose"]);

        let corpus = load_or_sentinel(&PdfSource::new(&path));

        assert_eq!(corpus.as_str(), "Opioids are drugs\nNaloxone reverses overdose");
    }

    #[test]
    fn trailing_page_breaks_are_stripped() {
        assert_eq!(strip_page_breaks("Opioids are drugs\n".to_string()), "Opioids are drugs");
        assert_eq!(strip_page_breaks("Fentanyl\r\n\n".to_string()), "Fentanyl");
        assert_eq!(strip_page_breaks("  indented\nbody".to_string()), "  indented\nbody");
    }

    #[test]
    fn break_only_pages_are_skipped_after_stripping() {
        let pages: Vec<String> = ["Opioids are drugs\n", "\n", "Naloxone reverses overdose\n"]
            .into_iter()
            .map(|page| strip_page_breaks(page.to_string()))
            .collect();

        let corpus = CorpusText::from_pages(pages);
        assert_eq!(corpus.as_str(), "Opioids are drugs\nNaloxone reverses overdose");
    }
}
