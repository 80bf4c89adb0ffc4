use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

use super::preprocess::prepare_for_ocr;
use super::setup::TesseractPaths;

/// A pixel position in the captured image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Four corners of a detected text box: top-left, top-right,
/// bottom-right, bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub corners: [Point; 4],
}

impl BoundingBox {
    /// Builds an axis-aligned box from its left/top edge and size.
    pub fn from_rect(left: i32, top: i32, width: i32, height: i32) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self {
            corners: [
                Point { x: left, y: top },
                Point { x: right, y: top },
                Point { x: right, y: bottom },
                Point { x: left, y: bottom },
            ],
        }
    }

    pub fn top_left(&self) -> Point {
        self.corners[0]
    }
}

/// One recognized piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub text: String,
    /// Recognition confidence in [0, 1]
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: BoundingBox, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence,
        }
    }
}

/// Anything that can turn an image file into text detections.
pub trait TextRecognizer {
    fn recognize(&self, image_path: &Path) -> Result<Vec<Detection>>;
}

/// Tesseract CLI wrapper producing line-level detections.
pub struct TesseractEngine {
    executable: PathBuf,
    tessdata: PathBuf,
    scale: u32,
    psm: u32,
}

impl TesseractEngine {
    pub fn new(paths: TesseractPaths, scale: u32, psm: u32) -> Self {
        Self {
            executable: paths.executable,
            tessdata: paths.tessdata,
            scale: scale.max(1),
            psm,
        }
    }
}

impl TextRecognizer for TesseractEngine {
    /// Runs Tesseract on the capture and returns one detection per text line.
    fn recognize(&self, image_path: &Path) -> Result<Vec<Detection>> {
        let img = image::open(image_path)
            .with_context(|| format!("Failed to open capture {}", image_path.display()))?;
        let prepared = prepare_for_ocr(&img, self.scale);

        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        prepared.save(temp_input.path())?;

        // Create temporary output file (Tesseract adds .tsv extension)
        let temp_output = NamedTempFile::new()?;
        let output_base = temp_output.path().to_string_lossy().to_string();

        let output = Command::new(&self.executable)
            .arg(temp_input.path())
            .arg(&output_base)
            .arg("--tessdata-dir")
            .arg(&self.tessdata)
            .arg("-l")
            .arg("eng")
            .arg("--psm")
            .arg(self.psm.to_string())
            .arg("tsv")
            .output()
            .context("Failed to launch Tesseract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        let tsv_path = format!("{}.tsv", output_base);
        let tsv_content = std::fs::read_to_string(&tsv_path)
            .map_err(|e| anyhow!("Failed to read Tesseract output: {}", e))?;
        let _ = std::fs::remove_file(&tsv_path);

        Ok(parse_tsv_output(&tsv_content, self.scale))
    }
}

/// Accumulates the words of one Tesseract text line.
struct LineBuilder {
    key: (i32, i32, i32, i32),
    words: Vec<String>,
    conf_sum: f32,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl LineBuilder {
    fn new(key: (i32, i32, i32, i32)) -> Self {
        Self {
            key,
            words: Vec::new(),
            conf_sum: 0.0,
            left: i32::MAX,
            top: i32::MAX,
            right: i32::MIN,
            bottom: i32::MIN,
        }
    }

    fn push(&mut self, text: &str, conf: f32, rect: (i32, i32, i32, i32)) {
        let (left, top, width, height) = rect;
        self.words.push(text.to_string());
        self.conf_sum += conf;
        self.left = self.left.min(left);
        self.top = self.top.min(top);
        self.right = self.right.max(left + width);
        self.bottom = self.bottom.max(top + height);
    }

    fn finish(self, scale: u32) -> Option<Detection> {
        if self.words.is_empty() {
            return None;
        }
        let s = scale.max(1) as i32;
        let confidence = self.conf_sum / self.words.len() as f32 / 100.0;
        let bbox = BoundingBox::from_rect(
            self.left / s,
            self.top / s,
            (self.right - self.left) / s,
            (self.bottom - self.top) / s,
        );
        Some(Detection::new(bbox, self.words.join(" "), confidence))
    }
}

/// Parses Tesseract TSV output into line detections.
///
/// Word rows (level 5) sharing page, block, paragraph and line numbers are
/// merged: their texts are joined with spaces, their boxes united, and their
/// confidences averaged and rescaled from 0-100 to 0-1. Box coordinates are
/// divided by `scale` to map back onto the original capture.
pub fn parse_tsv_output(tsv: &str, scale: u32) -> Vec<Detection> {
    let mut detections = Vec::new();
    let mut current: Option<LineBuilder> = None;

    for line in tsv.lines().skip(1) {
        // Skip header
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 12 {
            continue;
        }

        // TSV fields: level, page_num, block_num, par_num, line_num, word_num,
        //             left, top, width, height, conf, text
        let num = |i: usize| fields[i].trim().parse::<i32>().unwrap_or(-1);
        let level = num(0);
        let conf: f32 = fields[10].trim().parse().unwrap_or(-1.0);
        let text = fields[11].trim();

        // Level 5 = word
        if level != 5 || text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (num(1), num(2), num(3), num(4));
        let rect = (num(6), num(7), num(8), num(9));

        let same_line = current.as_ref().is_some_and(|b| b.key == key);
        if !same_line {
            if let Some(done) = current.take().and_then(|b| b.finish(scale)) {
                detections.push(done);
            }
            current = Some(LineBuilder::new(key));
        }
        if let Some(builder) = current.as_mut() {
            builder.push(text, conf, rect);
        }
    }

    // Don't forget the last line
    if let Some(done) = current.and_then(|b| b.finish(scale)) {
        detections.push(done);
    }

    detections
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_parse_groups_words_into_lines() {
        let content = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t800\t600\t-1\t",
            "4\t1\t1\t1\t1\t0\t20\t40\t200\t30\t-1\t",
            "5\t1\t1\t1\t1\t1\t20\t40\t90\t30\t96.5\tAlice",
            "5\t1\t1\t1\t1\t2\t120\t42\t100\t28\t91.5\tSmith",
            "5\t1\t2\t1\t1\t1\t400\t44\t120\t26\t88.0\t1,234",
        ]);

        let detections = parse_tsv_output(&content, 1);

        assert_eq!(detections.len(), 2);
        assert_eq!(detections[0].text, "Alice Smith");
        assert!((detections[0].confidence - 0.94).abs() < 1e-4);
        assert_eq!(detections[0].bbox, BoundingBox::from_rect(20, 40, 200, 30));
        assert_eq!(detections[1].text, "1,234");
        assert!((detections[1].confidence - 0.88).abs() < 1e-4);
    }

    #[test]
    fn test_parse_scales_boxes_back() {
        let content = tsv(&["5\t1\t1\t1\t1\t1\t40\t80\t180\t60\t90\tKevin"]);
        let detections = parse_tsv_output(&content, 2);
        assert_eq!(detections[0].bbox.top_left(), Point { x: 20, y: 40 });
        assert_eq!(detections[0].bbox.corners[2], Point { x: 110, y: 70 });
    }

    #[test]
    fn test_parse_skips_empty_and_unconfident_words() {
        let content = tsv(&[
            "5\t1\t1\t1\t1\t1\t10\t10\t10\t10\t-1\tghost",
            "5\t1\t1\t1\t1\t2\t30\t10\t10\t10\t95\t   ",
            "5\t1\t1\t1\t2\t1\t10\t50\t10\t10\t95\tMia",
            "malformed line",
        ]);
        let detections = parse_tsv_output(&content, 1);
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].text, "Mia");
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_tsv_output(HEADER, 1).is_empty());
        assert!(parse_tsv_output("", 1).is_empty());
    }

    #[test]
    fn test_bounding_box_corners() {
        let bbox = BoundingBox::from_rect(5, 6, 10, 20);
        assert_eq!(bbox.top_left(), Point { x: 5, y: 6 });
        assert_eq!(bbox.corners[1], Point { x: 15, y: 6 });
        assert_eq!(bbox.corners[3], Point { x: 5, y: 26 });
    }
}
