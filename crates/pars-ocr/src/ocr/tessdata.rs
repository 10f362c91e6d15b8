//! Locating Tesseract language data.

use std::path::{Path, PathBuf};

use super::error::OcrError;

const FALLBACK_TESSDATA_DIRS: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tesseract-ocr/4/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
    "/opt/homebrew/opt/tesseract/share/tessdata",
    "/usr/local/opt/tesseract/share/tessdata",
    r#"C:\Program Files\Tesseract-OCR\tessdata"#,
    r#"C:\ProgramData\Tesseract-OCR\tessdata"#,
];

/// Resolve the tessdata directory.
///
/// Order: the explicitly configured directory, then `TESSDATA_PREFIX`, then the
/// first existing well-known install location. `TESSDATA_PREFIX` may point at
/// the `tessdata` directory itself or at its parent.
pub fn resolve_tessdata_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = explicit {
        return Some(dir.to_path_buf());
    }

    if let Some(prefix) = std::env::var_os("TESSDATA_PREFIX").filter(|p| !p.is_empty()) {
        return Some(normalize_prefix(PathBuf::from(prefix)));
    }

    FALLBACK_TESSDATA_DIRS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_dir())
}

fn normalize_prefix(prefix: PathBuf) -> PathBuf {
    if prefix.ends_with("tessdata") || !prefix.join("tessdata").is_dir() {
        prefix
    } else {
        prefix.join("tessdata")
    }
}

/// Split a `fas+eng` style language list into codes, rejecting malformed ones.
pub fn split_languages(languages: &str) -> Result<Vec<&str>, OcrError> {
    if languages.trim().is_empty() {
        return Err(OcrError::InvalidLanguageCode(
            "Language cannot be empty. Please specify a valid language code (e.g., 'fas')".to_string(),
        ));
    }

    languages
        .split('+')
        .map(str::trim)
        .map(|code| {
            let well_formed = code.len() >= 3 && code.chars().all(|c| c.is_ascii_lowercase() || c == '_');
            if well_formed {
                Ok(code)
            } else {
                Err(OcrError::InvalidLanguageCode(format!(
                    "Language code '{}' in '{}' is not a Tesseract language code",
                    code, languages
                )))
            }
        })
        .collect()
}

/// Fail early when a requested language has no `.traineddata` file; Tesseract
/// tends to abort the process instead of returning an error in that case.
pub fn ensure_languages_installed(tessdata_dir: &Path, languages: &str) -> Result<(), OcrError> {
    for code in split_languages(languages)? {
        let traineddata = tessdata_dir.join(format!("{}.traineddata", code));
        if !traineddata.is_file() {
            return Err(OcrError::TesseractInitializationFailed(format!(
                "Language '{}' not found. Traineddata file does not exist: {}",
                code,
                traineddata.display()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_dir_wins() {
        let dir = tempdir().unwrap();
        assert_eq!(resolve_tessdata_dir(Some(dir.path())), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_normalize_prefix_appends_tessdata() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("tessdata")).unwrap();

        assert_eq!(normalize_prefix(dir.path().to_path_buf()), dir.path().join("tessdata"));
        assert_eq!(
            normalize_prefix(dir.path().join("tessdata")),
            dir.path().join("tessdata")
        );
    }

    #[test]
    fn test_normalize_prefix_without_subdir() {
        let dir = tempdir().unwrap();
        assert_eq!(normalize_prefix(dir.path().to_path_buf()), dir.path().to_path_buf());
    }

    #[test]
    fn test_split_languages() {
        assert_eq!(split_languages("fas+eng").unwrap(), vec!["fas", "eng"]);
        assert_eq!(split_languages("chi_sim").unwrap(), vec!["chi_sim"]);
        assert!(matches!(split_languages(""), Err(OcrError::InvalidLanguageCode(_))));
        assert!(split_languages("fas+").is_err());
        assert!(split_languages("FAS").is_err());
        assert!(split_languages("fa").is_err());
    }

    #[test]
    fn test_ensure_languages_installed() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("fas.traineddata"), b"").unwrap();

        assert!(ensure_languages_installed(dir.path(), "fas").is_ok());

        let err = ensure_languages_installed(dir.path(), "fas+eng").unwrap_err();
        assert!(matches!(err, OcrError::TesseractInitializationFailed(_)));
        assert!(err.to_string().contains("eng.traineddata"));
    }
}
