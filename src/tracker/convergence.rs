//! Scroll-convergence loop.
//!
//! Captures the first page, then keeps scrolling and capturing until the
//! last `duplicate_limit` pages read back identical. The list has no known
//! length, so an unchanged page after scrolling is taken as its end.

use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::log;
use crate::ocr::NameFanPair;

/// Produces page images, scrolling between them.
pub trait PageSource {
    fn capture_first(&mut self) -> Result<PathBuf>;
    fn scroll_and_capture(&mut self) -> Result<PathBuf>;
}

/// Turns one page image into ordered name/fan pairs.
pub trait PageReader {
    fn read_page(&self, image_path: &Path) -> Result<Vec<NameFanPair>>;
}

/// Window of consecutive identical pages.
#[derive(Debug, Clone)]
pub struct ConvergenceWindow {
    last: Vec<NameFanPair>,
    repeats: usize,
    limit: usize,
}

impl ConvergenceWindow {
    /// Starts the window with the first page already seen once.
    pub fn new(first: Vec<NameFanPair>, limit: usize) -> Self {
        Self {
            last: first,
            repeats: 1,
            limit: limit.max(1),
        }
    }

    /// Records a page. Returns true once `limit` identical pages are in a row.
    ///
    /// Equality is exact and ordered: a single differing character restarts
    /// the count at 1.
    pub fn observe(&mut self, page: Vec<NameFanPair>) -> bool {
        if page == self.last {
            self.repeats += 1;
        } else {
            self.last = page;
            self.repeats = 1;
        }
        self.is_converged()
    }

    pub fn is_converged(&self) -> bool {
        self.repeats >= self.limit
    }

    pub fn repeats(&self) -> usize {
        self.repeats
    }
}

/// Loop termination settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergenceSettings {
    pub duplicate_limit: usize,
    /// Stop after this many pages even without convergence
    pub max_pages: Option<u32>,
}

impl Default for ConvergenceSettings {
    fn default() -> Self {
        Self {
            duplicate_limit: 3,
            max_pages: None,
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The same page was read `duplicate_limit` times in a row
    Converged,
    CaptureFailed(String),
    ReadFailed(String),
    PageLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Converged => write!(f, "end of list reached"),
            StopReason::CaptureFailed(msg) => write!(f, "capture failed: {}", msg),
            StopReason::ReadFailed(msg) => write!(f, "OCR failed: {}", msg),
            StopReason::PageLimit => write!(f, "page limit reached"),
        }
    }
}

/// Everything collected during one scroll run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollOutcome {
    /// Pairs of every page in capture order, duplicates included
    pub all_pairs: Vec<NameFanPair>,
    /// Pages successfully read
    pub pages: u32,
    pub stop: StopReason,
}

fn log_page(number: u32, pairs: &[NameFanPair]) {
    log(&format!("📄 Page {} Results:", number));
    for pair in pairs {
        log(&format!("👤 {:<15} | 🏁 {}", pair.name, pair.fans));
    }
}

/// Runs capture, read and scroll cycles until the list stops changing.
///
/// Failures end the loop instead of propagating: whatever was collected so
/// far is returned together with the reason.
pub fn run_scroll_loop<S, R>(source: &mut S, reader: &R, settings: ConvergenceSettings) -> ScrollOutcome
where
    S: PageSource + ?Sized,
    R: PageReader + ?Sized,
{
    let mut all_pairs = Vec::new();

    let first = match source.capture_first() {
        Ok(path) => match reader.read_page(&path) {
            Ok(pairs) => pairs,
            Err(e) => {
                log(&format!("❌ OCR failed: {}", e));
                return ScrollOutcome {
                    all_pairs,
                    pages: 0,
                    stop: StopReason::ReadFailed(e.to_string()),
                };
            }
        },
        Err(e) => {
            log(&format!("❌ Screenshot failed: {}", e));
            return ScrollOutcome {
                all_pairs,
                pages: 0,
                stop: StopReason::CaptureFailed(e.to_string()),
            };
        }
    };

    log_page(1, &first);
    all_pairs.extend(first.iter().cloned());
    let mut pages = 1;
    let mut window = ConvergenceWindow::new(first, settings.duplicate_limit);

    let stop = loop {
        if window.is_converged() {
            break StopReason::Converged;
        }
        if settings.max_pages.is_some_and(|max| pages >= max) {
            log(&format!("⚠️ Page limit of {} reached. Stopping.", pages));
            break StopReason::PageLimit;
        }

        let path = match source.scroll_and_capture() {
            Ok(path) => path,
            Err(e) => {
                log(&format!("❌ Screenshot failed: {}", e));
                break StopReason::CaptureFailed(e.to_string());
            }
        };
        let page = match reader.read_page(&path) {
            Ok(page) => page,
            Err(e) => {
                log(&format!("❌ OCR failed: {}", e));
                break StopReason::ReadFailed(e.to_string());
            }
        };

        pages += 1;
        log_page(pages, &page);
        all_pairs.extend(page.iter().cloned());

        if window.observe(page) {
            log(&format!(
                "⚠️ Same OCR results detected {} times. Stopping.",
                window.repeats()
            ));
        }
    };

    ScrollOutcome {
        all_pairs,
        pages,
        stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;

    fn page(names: &[(&str, &str)]) -> Vec<NameFanPair> {
        names
            .iter()
            .map(|(name, fans)| NameFanPair::new(*name, *fans))
            .collect()
    }

    /// Serves numbered image paths; fails once `fail_at` captures were made.
    struct FakeSource {
        captures: u32,
        fail_at: Option<u32>,
    }

    impl FakeSource {
        fn new(fail_at: Option<u32>) -> Self {
            Self {
                captures: 0,
                fail_at,
            }
        }

        fn next(&mut self) -> Result<PathBuf> {
            if self.fail_at == Some(self.captures) {
                return Err(anyhow!("no image"));
            }
            self.captures += 1;
            Ok(PathBuf::from(format!("page{}.png", self.captures)))
        }
    }

    impl PageSource for FakeSource {
        fn capture_first(&mut self) -> Result<PathBuf> {
            self.next()
        }

        fn scroll_and_capture(&mut self) -> Result<PathBuf> {
            self.next()
        }
    }

    /// Reads page N as the N-th scripted page; the last one repeats forever.
    struct ScriptedReader {
        pages: Vec<Vec<NameFanPair>>,
        broken: HashMap<String, String>,
    }

    impl ScriptedReader {
        fn new(pages: Vec<Vec<NameFanPair>>) -> Self {
            Self {
                pages,
                broken: HashMap::new(),
            }
        }
    }

    impl PageReader for ScriptedReader {
        fn read_page(&self, image_path: &Path) -> Result<Vec<NameFanPair>> {
            let name = image_path.to_string_lossy().to_string();
            if let Some(msg) = self.broken.get(&name) {
                return Err(anyhow!("{}", msg));
            }
            let index: usize = name
                .trim_start_matches("page")
                .trim_end_matches(".png")
                .parse()
                .unwrap();
            Ok(self.pages[(index - 1).min(self.pages.len() - 1)].clone())
        }
    }

    #[test]
    fn test_window_counts_identical_pages() {
        let a = page(&[("Kevin", "500")]);
        let b = page(&[("Mia", "300")]);
        let mut window = ConvergenceWindow::new(a.clone(), 3);

        assert!(!window.observe(a.clone()));
        assert_eq!(window.repeats(), 2);
        assert!(!window.observe(b.clone()));
        assert_eq!(window.repeats(), 1);
        assert!(!window.observe(b.clone()));
        assert!(window.observe(b));
    }

    #[test]
    fn test_window_order_matters() {
        let ab = page(&[("Kevin", "500"), ("Mia", "300")]);
        let ba = page(&[("Mia", "300"), ("Kevin", "500")]);
        let mut window = ConvergenceWindow::new(ab, 3);
        window.observe(ba);
        assert_eq!(window.repeats(), 1);
    }

    #[test]
    fn test_loop_stops_after_three_identical_pages() {
        let a = page(&[("Kevin", "500"), ("Mia", "300")]);
        let b = page(&[("Mia", "300"), ("Zoe", "100")]);
        let reader = ScriptedReader::new(vec![a, b]);
        let mut source = FakeSource::new(None);

        let outcome = run_scroll_loop(&mut source, &reader, ConvergenceSettings::default());

        // A, B, B, B
        assert_eq!(outcome.stop, StopReason::Converged);
        assert_eq!(outcome.pages, 4);
        assert_eq!(outcome.all_pairs.len(), 8);
        assert_eq!(outcome.all_pairs[0], NameFanPair::new("Kevin", "500"));
    }

    #[test]
    fn test_loop_unchanging_list() {
        let reader = ScriptedReader::new(vec![page(&[("Kevin", "500")])]);
        let mut source = FakeSource::new(None);

        let outcome = run_scroll_loop(&mut source, &reader, ConvergenceSettings::default());

        assert_eq!(outcome.stop, StopReason::Converged);
        assert_eq!(outcome.pages, 3);
        assert_eq!(outcome.all_pairs.len(), 3);
    }

    #[test]
    fn test_capture_failure_keeps_collected_pairs() {
        let reader = ScriptedReader::new(vec![
            page(&[("Kevin", "500")]),
            page(&[("Mia", "300")]),
        ]);
        let mut source = FakeSource::new(Some(2));

        let outcome = run_scroll_loop(&mut source, &reader, ConvergenceSettings::default());

        assert_eq!(outcome.stop, StopReason::CaptureFailed("no image".to_string()));
        assert_eq!(outcome.pages, 2);
        assert_eq!(outcome.all_pairs, page(&[("Kevin", "500"), ("Mia", "300")]));
    }

    #[test]
    fn test_first_capture_failure() {
        let reader = ScriptedReader::new(vec![page(&[("Kevin", "500")])]);
        let mut source = FakeSource::new(Some(0));

        let outcome = run_scroll_loop(&mut source, &reader, ConvergenceSettings::default());

        assert_eq!(outcome.pages, 0);
        assert!(outcome.all_pairs.is_empty());
        assert!(matches!(outcome.stop, StopReason::CaptureFailed(_)));
    }

    #[test]
    fn test_read_failure_ends_loop() {
        let mut reader = ScriptedReader::new(vec![
            page(&[("Kevin", "500")]),
            page(&[("Mia", "300")]),
        ]);
        reader
            .broken
            .insert("page2.png".to_string(), "tesseract crashed".to_string());
        let mut source = FakeSource::new(None);

        let outcome = run_scroll_loop(&mut source, &reader, ConvergenceSettings::default());

        assert_eq!(
            outcome.stop,
            StopReason::ReadFailed("tesseract crashed".to_string())
        );
        assert_eq!(outcome.pages, 1);
        assert_eq!(outcome.all_pairs, page(&[("Kevin", "500")]));
    }

    #[test]
    fn test_page_limit() {
        let pages = (0..10)
            .map(|i| page(&[("Kevin", &i.to_string())]))
            .collect::<Vec<_>>();
        let reader = ScriptedReader::new(pages);
        let mut source = FakeSource::new(None);
        let settings = ConvergenceSettings {
            duplicate_limit: 3,
            max_pages: Some(4),
        };

        let outcome = run_scroll_loop(&mut source, &reader, settings);

        assert_eq!(outcome.stop, StopReason::PageLimit);
        assert_eq!(outcome.pages, 4);
        assert_eq!(source.captures, 4);
    }
}
