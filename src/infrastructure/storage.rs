use std::fs;
use std::path::{Path, PathBuf};

pub fn ensure_output_dir(output_dir: &Path) -> std::io::Result<PathBuf> {
    ensure_dir(output_dir)?;
    Ok(output_dir.to_path_buf())
}

/// `QA_Report_<YYYYmmdd_HHMMSS>_<8 hex>.xlsx`; the random suffix keeps two
/// reports generated within the same second apart.
pub fn report_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("QA_Report_{}_{}.xlsx", now.format("%Y%m%d_%H%M%S"), &suffix[..8])
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_report_file_name_encodes_timestamp() {
        let now = chrono::Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let name = report_file_name(now);
        assert!(name.starts_with("QA_Report_20240309_140507_"), "{}", name);
        assert!(name.ends_with(".xlsx"));
        assert_eq!(name.len(), "QA_Report_20240309_140507_".len() + 8 + ".xlsx".len());
    }

    #[test]
    fn test_same_second_names_differ() {
        let now = chrono::Local::now();
        assert_ne!(report_file_name(now), report_file_name(now));
    }

    #[test]
    fn test_ensure_output_dir_creates_nested() {
        let dir = tempdir().expect("temp directory should exist");
        let nested = dir.path().join("reports").join("qa");
        let created = ensure_output_dir(&nested).expect("dir should be created");
        assert!(created.is_dir());
    }
}
