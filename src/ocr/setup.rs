use anyhow::{anyhow, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::log;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";
const TRAINED_DATA: &str = "eng.traineddata";

#[cfg(windows)]
const EXECUTABLE_NAME: &str = "tesseract.exe";
#[cfg(not(windows))]
const EXECUTABLE_NAME: &str = "tesseract";

#[cfg(windows)]
const COMMON_INSTALL_DIRS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR",
    r"C:\Program Files (x86)\Tesseract-OCR",
];
#[cfg(not(windows))]
const COMMON_INSTALL_DIRS: &[&str] = &["/usr/bin", "/usr/local/bin", "/opt/homebrew/bin"];

#[cfg(windows)]
const SYSTEM_TESSDATA_DIRS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];
#[cfg(not(windows))]
const SYSTEM_TESSDATA_DIRS: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
];

#[derive(Debug, Clone)]
pub struct TesseractPaths {
    pub executable: PathBuf,
    pub tessdata: PathBuf,
}

/// Returns the directory for storing Tesseract files
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("club-fan-tracker")
        .join("tesseract")
}

/// Ensures Tesseract and English trained data are available.
///
/// The executable must be installed by the user; the trained data is
/// downloaded into the local tool directory if no copy can be found.
pub fn ensure_tesseract() -> Result<TesseractPaths> {
    let executable = find_tesseract_executable()?;

    let tessdata = match find_tessdata_dir() {
        Ok(dir) => dir,
        Err(_) => {
            let local = get_tesseract_dir().join("tessdata");
            download_tessdata(&local)?;
            local
        }
    };

    log(&format!(
        "Tesseract ready: {} (data: {})",
        executable.display(),
        tessdata.display()
    ));

    Ok(TesseractPaths {
        executable,
        tessdata,
    })
}

/// Finds the Tesseract executable, checking our local dir first, then system
pub fn find_tesseract_executable() -> Result<PathBuf> {
    let local_exe = get_tesseract_dir().join(EXECUTABLE_NAME);
    if local_exe.exists() {
        return Ok(local_exe);
    }

    // Check PATH
    if let Ok(output) = Command::new("tesseract").arg("--version").output() {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    for dir in COMMON_INSTALL_DIRS {
        let p = Path::new(dir).join(EXECUTABLE_NAME);
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "Tesseract not found. Please install Tesseract-OCR and add it to PATH, \
         or copy it to: {}",
        get_tesseract_dir().display()
    ))
}

/// Finds a tessdata directory containing English trained data.
pub fn find_tessdata_dir() -> Result<PathBuf> {
    let mut candidates = vec![get_tesseract_dir().join("tessdata")];
    candidates.extend(SYSTEM_TESSDATA_DIRS.iter().map(PathBuf::from));

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        candidates.push(p.join("tessdata"));
        candidates.push(p);
    }

    first_with_trained_data(&candidates).ok_or_else(|| {
        anyhow!(
            "tessdata directory not found. Please ensure {} is available.",
            TRAINED_DATA
        )
    })
}

fn first_with_trained_data(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|dir| dir.join(TRAINED_DATA).exists())
        .cloned()
}

/// Downloads English trained data into `tessdata_dir`.
fn download_tessdata(tessdata_dir: &Path) -> Result<()> {
    fs::create_dir_all(tessdata_dir)?;
    let eng_url = format!("{}/{}", TESSDATA_REPO, TRAINED_DATA);
    let eng_path = tessdata_dir.join(TRAINED_DATA);

    log(&format!("Downloading {}...", TRAINED_DATA));

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let response = client
        .get(&eng_url)
        .header("User-Agent", "club-fan-tracker")
        .send()?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}: HTTP {}",
            TRAINED_DATA,
            response.status()
        ));
    }

    let bytes = response.bytes()?;
    let mut file = fs::File::create(&eng_path)?;
    file.write_all(&bytes)?;

    log(&format!("Downloaded {} ({} bytes)", TRAINED_DATA, bytes.len()));

    Ok(())
}
