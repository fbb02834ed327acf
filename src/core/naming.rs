use crate::domain::model::CompressionSettings;
use std::path::{Path, PathBuf};

/// 決定輸出路徑。
///
/// 輸入與輸出副檔名相同 (不分大小寫) 時：刪除原檔則原地覆寫並保留原檔名，
/// 否則在檔名後加上後綴避免覆蓋原檔；其他情況直接替換副檔名。
pub fn plan_output(input: &Path, settings: &CompressionSettings) -> PathBuf {
    let extension = settings.format.extension();
    let input_extension = input
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    if input_extension == extension && settings.delete_original {
        // 保留原本的大小寫，不分大小寫的檔案系統上才不會變成兩個不同路徑
        input.to_path_buf()
    } else if input_extension == extension {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = format!("{}{}{}", stem, settings.postfix(), extension);
        match input.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        }
    } else {
        input.with_extension(extension.trim_start_matches('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{OutputFormat, Quality};

    fn settings(format: OutputFormat) -> CompressionSettings {
        CompressionSettings::new(format, Quality::default())
    }

    #[test]
    fn test_replaces_extension_when_formats_differ() {
        let out = plan_output(Path::new("photos/cat.png"), &settings(OutputFormat::Webp));
        assert_eq!(out, PathBuf::from("photos/cat.webp"));

        // .jpeg 與 .jpg 視為不同副檔名
        let out = plan_output(Path::new("photos/dog.jpeg"), &settings(OutputFormat::Jpeg));
        assert_eq!(out, PathBuf::from("photos/dog.jpg"));
    }

    #[test]
    fn test_adds_postfix_when_extension_matches() {
        let out = plan_output(Path::new("photos/cat.JPG"), &settings(OutputFormat::Jpeg));
        assert_eq!(out, PathBuf::from("photos/cat_compressed.jpg"));

        let custom = settings(OutputFormat::Avif).with_postfix("_small");
        let out = plan_output(Path::new("a/b.avif"), &custom);
        assert_eq!(out, PathBuf::from("a/b_small.avif"));
    }

    #[test]
    fn test_same_extension_with_delete_original_overwrites_in_place() {
        let s = settings(OutputFormat::Jpeg).with_delete_original(true);
        let out = plan_output(Path::new("photos/cat.jpg"), &s);
        assert_eq!(out, PathBuf::from("photos/cat.jpg"));

        let out = plan_output(Path::new("photos/IMG_0001.JPG"), &s);
        assert_eq!(out, PathBuf::from("photos/IMG_0001.JPG"));
    }

    #[test]
    fn test_keeps_dots_inside_stem() {
        let out = plan_output(Path::new("trip.2024.06.png"), &settings(OutputFormat::Avif));
        assert_eq!(out, PathBuf::from("trip.2024.06.avif"));
    }
}
