// ============================================================
// Layer 4 — Review Loader
// ============================================================
// Loads labelled reviews from a directory laid out like the
// Stanford "aclImdb" release:
//
//   aclImdb/
//     train/
//       pos/  0_9.txt  1_7.txt ...   ← label 1
//       neg/  0_3.txt  1_1.txt ...   ← label 0
//     test/
//       pos/ ...
//       neg/ ...
//
// The loader is pointed at one split directory (e.g.
// `aclImdb/train`) and reads every .txt file under pos/ and neg/.
// Files are visited in name order so runs are reproducible.

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::domain::review::Review;
use crate::domain::traits::ReviewSource;

/// Loads all reviews under `<dir>/pos` and `<dir>/neg`.
/// Implements the ReviewSource trait from Layer 3.
pub struct ReviewLoader {
    dir: String,
}

impl ReviewLoader {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReviewSource for ReviewLoader {
    fn load_all(&self) -> Result<Vec<Review>> {
        let dir = Path::new(&self.dir);

        if !dir.exists() {
            tracing::warn!(
                "Review directory '{}' does not exist, returning empty corpus",
                self.dir
            );
            return Ok(Vec::new());
        }

        let mut reviews = load_label_dir(&dir.join("pos"), 1)?;
        reviews.extend(load_label_dir(&dir.join("neg"), 0)?);

        let positives = reviews.iter().filter(|r| r.is_positive()).count();
        tracing::info!(
            "Loaded {} reviews ({} positive, {} negative)",
            reviews.len(),
            positives,
            reviews.len() - positives
        );
        Ok(reviews)
    }
}

fn load_label_dir(dir: &Path, label: u8) -> Result<Vec<Review>> {
    if !dir.is_dir() {
        tracing::warn!("Missing label directory '{}'", dir.display());
        return Ok(Vec::new());
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("txt") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut reviews = Vec::with_capacity(paths.len());
    for path in paths {
        match fs::read_to_string(&path) {
            Ok(text) => {
                let source = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown")
                    .to_string();
                reviews.push(Review::new(source, text, label));
            }
            // One unreadable file should not abort a training run
            Err(e) => tracing::warn!("Skipping '{}': {}", path.display(), e),
        }
    }
    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, text: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn test_loads_both_labels_in_name_order() {
        let root = tempfile::tempdir().unwrap();
        write(&root.path().join("pos"), "2_8.txt", "loved it");
        write(&root.path().join("pos"), "1_9.txt", "brilliant");
        write(&root.path().join("neg"), "0_1.txt", "dreadful");
        write(&root.path().join("neg"), "notes.md", "ignored");

        let reviews = ReviewLoader::new(root.path().to_str().unwrap())
            .load_all()
            .unwrap();

        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[0].text, "brilliant");
        assert_eq!(reviews[0].label, 1);
        assert_eq!(reviews[1].source, "2_8.txt");
        assert_eq!(reviews[2].label, 0);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let reviews = ReviewLoader::new("/definitely/not/here").load_all().unwrap();
        assert!(reviews.is_empty());
    }
}
