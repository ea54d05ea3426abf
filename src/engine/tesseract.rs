//! Tesseract OCR backend
//!
//! Runs the `tesseract` CLI once per image and reads its TSV report. Each call
//! is its own process, so concurrent calls do not share engine state.
//!
//! With orientation detection on (the default), pages go through tesseract's
//! OSD pass (`--psm 1`) so rotated and upside-down scans read correctly.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::{rect_quad, Detection, DetectionGroup, OcrEngine};
use crate::config::OcrConfig;
use crate::ocr::OcrError;

/// TSV row level for a single word
const WORD_LEVEL: u32 = 5;
/// Columns in a tesseract TSV row
const TSV_COLUMNS: usize = 12;

/// Map a short language code (`ch`, `en`, `japan`, ...) onto a tesseract language set.
///
/// Unknown codes pass through, so native tesseract codes (`eng+deu`) work too.
pub fn tesseract_languages(lang: &str) -> String {
    let mapped = match lang.trim().to_ascii_lowercase().as_str() {
        "ch" => "chi_sim+eng",
        "chinese_cht" => "chi_tra+eng",
        "en" => "eng",
        "japan" => "jpn+eng",
        "korean" => "kor+eng",
        "fr" | "french" => "fra",
        "german" | "de" => "deu",
        "es" => "spa",
        "ru" => "rus",
        "ar" => "ara",
        "latin" => "lat",
        _ => return lang.trim().to_string(),
    };
    mapped.to_string()
}

/// Page segmentation: automatic, with orientation and script detection
const PSM_AUTO_OSD: &str = "1";
/// Page segmentation: automatic, page assumed upright
const PSM_AUTO: &str = "3";
/// Traineddata needed by orientation detection
const OSD_LANGUAGE: &str = "osd";

/// Tesseract OCR engine
pub struct TesseractEngine {
    command: String,
    languages: String,
    tessdata_dir: Option<PathBuf>,
    /// Rotated and upside-down pages are turned upright before recognition
    detect_orientation: bool,
}

impl TesseractEngine {
    pub fn new(config: &OcrConfig) -> Self {
        if config.use_gpu {
            tracing::warn!("USE_GPU is set but the tesseract backend runs on CPU only");
        }

        Self {
            command: config.tesseract_cmd.clone(),
            languages: tesseract_languages(&config.lang),
            tessdata_dir: config.tessdata_dir.clone(),
            detect_orientation: config.angle_cls,
        }
    }

    /// Tesseract language set passed via `-l`
    pub fn languages(&self) -> &str {
        &self.languages
    }

    /// Every traineddata file the engine needs, `osd` included when
    /// orientation detection is on.
    pub fn required_languages(&self) -> Vec<&str> {
        let mut required: Vec<&str> = self
            .languages
            .split('+')
            .filter(|lang| !lang.is_empty())
            .collect();
        if self.detect_orientation && !required.contains(&OSD_LANGUAGE) {
            required.push(OSD_LANGUAGE);
        }
        required
    }

    fn page_segmentation_mode(&self) -> &'static str {
        if self.detect_orientation {
            PSM_AUTO_OSD
        } else {
            PSM_AUTO
        }
    }

    /// Arguments for one recognition run, after any `--tessdata-dir`.
    fn recognize_args(&self, image: &Path) -> Vec<OsString> {
        vec![
            image.as_os_str().to_os_string(),
            "stdout".into(),
            "-l".into(),
            self.languages.as_str().into(),
            "--psm".into(),
            self.page_segmentation_mode().into(),
            "tsv".into(),
        ]
    }

    fn base_command(&self) -> Command {
        let mut command = Command::new(&self.command);
        if let Some(dir) = &self.tessdata_dir {
            command.arg("--tessdata-dir").arg(dir);
        }
        command
    }

    fn run(&self, command: &mut Command, what: &str) -> Result<Output, OcrError> {
        command.output().map_err(|e| {
            OcrError::EngineUnavailable(format!("Failed to run {} ({}): {}", self.command, what, e))
        })
    }

    /// Check that the executable runs and every required language is installed.
    ///
    /// Returns the first line of `tesseract --version`.
    pub fn probe(&self) -> Result<String, OcrError> {
        let output = self.run(Command::new(&self.command).arg("--version"), "version")?;
        if !output.status.success() {
            return Err(OcrError::EngineUnavailable(format!(
                "{} --version exited with {}",
                self.command, output.status
            )));
        }
        // Older releases print the version banner on stderr.
        let version = first_line(&output.stdout)
            .or_else(|| first_line(&output.stderr))
            .unwrap_or_else(|| "unknown version".to_string());

        let output = self.run(self.base_command().arg("--list-langs"), "list-langs")?;
        let listing = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        let missing = missing_languages(&self.required_languages(), &listing);
        if !missing.is_empty() {
            return Err(OcrError::EngineUnavailable(format!(
                "tesseract language data not installed: {}",
                missing.join(", ")
            )));
        }

        Ok(version)
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &Path) -> Result<Vec<DetectionGroup>, OcrError> {
        let output = self
            .base_command()
            .args(self.recognize_args(image))
            .output()
            .map_err(|e| OcrError::Recognition(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let groups = parse_tsv(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!(
            image = %image.display(),
            groups = groups.len(),
            "tesseract finished"
        );
        Ok(groups)
    }
}

/// Languages from `required` that do not appear in a `--list-langs` listing.
pub fn missing_languages<'a>(required: &[&'a str], listing: &str) -> Vec<&'a str> {
    let installed: Vec<&str> = listing.lines().map(str::trim).collect();
    required
        .iter()
        .copied()
        .filter(|lang| !installed.contains(lang))
        .collect()
}

fn first_line(bytes: &[u8]) -> Option<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Words of one text line while the TSV is being read
#[derive(Default)]
struct LineBuilder {
    words: Vec<String>,
    confidence_sum: f32,
    confidence_count: u32,
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl LineBuilder {
    fn push(&mut self, text: &str, confidence: f32, left: f32, top: f32, width: f32, height: f32) {
        let (right, bottom) = (left + width, top + height);
        if self.words.is_empty() {
            (self.left, self.top, self.right, self.bottom) = (left, top, right, bottom);
        } else {
            self.left = self.left.min(left);
            self.top = self.top.min(top);
            self.right = self.right.max(right);
            self.bottom = self.bottom.max(bottom);
        }
        if confidence >= 0.0 {
            self.confidence_sum += confidence;
            self.confidence_count += 1;
        }
        self.words.push(text.to_string());
    }

    fn finish(self) -> Option<Detection> {
        if self.words.is_empty() {
            return None;
        }
        let confidence = if self.confidence_count == 0 {
            0.0
        } else {
            self.confidence_sum / self.confidence_count as f32 / 100.0
        };
        Some(Detection {
            quad: rect_quad(self.left, self.top, self.right, self.bottom),
            text: join_words(&self.words),
            confidence,
        })
    }
}

/// Parse tesseract TSV output into one group per block, one detection per line.
///
/// Word rows are merged into their line: the box is the union of the word
/// boxes and the confidence the mean word confidence scaled to 0-1.
pub fn parse_tsv(tsv: &str) -> Vec<DetectionGroup> {
    let mut groups: Vec<DetectionGroup> = Vec::new();
    let mut current_block: Option<(u32, u32)> = None;
    let mut current_line: Option<(u32, u32, u32, u32)> = None;
    let mut line = LineBuilder::default();

    for row in tsv.lines() {
        let fields: Vec<&str> = row.splitn(TSV_COLUMNS, '\t').collect();
        if fields.len() < TSV_COLUMNS - 1 {
            continue;
        }
        let ints: Option<Vec<u32>> = fields[..5].iter().map(|f| f.trim().parse().ok()).collect();
        let Some(ints) = ints else {
            // header row or garbage
            continue;
        };
        if ints[0] != WORD_LEVEL {
            continue;
        }
        let text = fields.get(11).map(|t| t.trim()).unwrap_or("");
        if text.is_empty() {
            continue;
        }
        let num = |i: usize| fields[i].trim().parse::<f32>().unwrap_or(0.0);
        let confidence = fields[10].trim().parse::<f32>().unwrap_or(-1.0);

        let block_key = (ints[1], ints[2]);
        let line_key = (ints[1], ints[2], ints[3], ints[4]);

        if current_line != Some(line_key) {
            if let Some(done) = std::mem::take(&mut line).finish() {
                if let Some(group) = groups.last_mut() {
                    group.push(done);
                }
            }
            current_line = Some(line_key);
        }
        if current_block != Some(block_key) {
            groups.push(Vec::new());
            current_block = Some(block_key);
        }

        line.push(text, confidence, num(6), num(7), num(8), num(9));
    }

    if let Some(done) = line.finish() {
        if let Some(group) = groups.last_mut() {
            group.push(done);
        }
    }

    groups.retain(|group| !group.is_empty());
    groups
}

/// Join words with spaces, except between two CJK characters.
fn join_words(words: &[String]) -> String {
    let mut out = String::new();
    for word in words {
        let glue = match (out.chars().last(), word.chars().next()) {
            (Some(prev), Some(next)) => !(is_cjk(prev) && is_cjk(next)),
            _ => false,
        };
        if glue {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3040..=0x30FF     // kana
        | 0x3400..=0x4DBF   // CJK extension A
        | 0x4E00..=0x9FFF   // CJK unified ideographs
        | 0xAC00..=0xD7AF   // hangul syllables
        | 0xF900..=0xFAFF   // compatibility ideographs
        | 0x3000..=0x303F   // CJK punctuation
        | 0xFF00..=0xFFEF)  // full-width forms
}
