use crate::domain::model::SUPPORTED_INPUT_EXTENSIONS;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 去除使用者貼上路徑時常帶的引號與空白
pub fn strip_quotes(raw: &str) -> PathBuf {
    PathBuf::from(raw.trim().trim_matches('"').trim())
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_INPUT_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Collected {
    pub images: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
}

/// 從檔案與資料夾收集所有支援的圖片，資料夾會遞迴掃描
pub fn collect_images<P: AsRef<Path>>(paths: &[P]) -> Collected {
    let mut collected = Collected::default();

    for path in paths {
        let path = path.as_ref();
        if path.is_file() {
            if is_supported_image(path) {
                collected.images.push(path.to_path_buf());
            } else {
                tracing::debug!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            let walker = WalkDir::new(path)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter();
            for entry in walker {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && is_supported_image(entry.path()) => {
                        collected.images.push(entry.into_path());
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("⚠️ Cannot read directory entry: {}", e),
                }
            }
        } else {
            tracing::warn!("⚠️ Path does not exist: {}", path.display());
            collected.missing.push(path.to_path_buf());
        }
    }

    collected
}

/// 移除重複路徑並保留原始順序，回傳 (唯一路徑, 移除數量)
pub fn dedup_preserving_order(files: Vec<PathBuf>) -> (Vec<PathBuf>, usize) {
    let original = files.len();
    let mut seen = HashSet::with_capacity(original);
    let unique: Vec<PathBuf> = files
        .into_iter()
        .filter(|file| seen.insert(file.clone()))
        .collect();
    let removed = original - unique.len();
    (unique, removed)
}

/// 一次加入的結果；`missing` 為不存在而被略過的路徑
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueAdd {
    pub added: usize,
    pub total: usize,
    pub missing: Vec<PathBuf>,
}

/// 待處理檔案佇列：多次加入時累加而不是取代，並忽略已在佇列中的檔案
#[derive(Debug, Default, Clone)]
pub struct FileQueue {
    files: Vec<PathBuf>,
    index: HashSet<PathBuf>,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<P: AsRef<Path>>(&mut self, paths: &[P]) -> QueueAdd {
        let collected = collect_images(paths);
        let mut added = 0;
        for image in collected.images {
            if self.index.insert(image.clone()) {
                self.files.push(image);
                added += 1;
            }
        }
        QueueAdd {
            added,
            total: self.files.len(),
            missing: collected.missing,
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.index.clear();
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
