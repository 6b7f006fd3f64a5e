//! Debug dump of final markup

use std::path::{Path, PathBuf};

/// Write `markup` to `{base}/html/{index:03}.html` for offline inspection
pub(crate) async fn write_markup(base: &Path, index: u64, markup: &str) -> std::io::Result<PathBuf> {
    let dir = base.join("html");
    tokio::fs::create_dir_all(&dir).await?;

    let path = dir.join(format!("{:03}.html", index));
    tokio::fs::write(&path, markup).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_numbered_file() {
        let base = std::env::temp_dir().join(format!("html-renderer-artifact-{}", std::process::id()));

        let path = write_markup(&base, 7, "<p>x</p>").await.unwrap();
        assert!(path.ends_with("html/007.html"));
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "<p>x</p>");

        let _ = tokio::fs::remove_dir_all(&base).await;
    }
}
