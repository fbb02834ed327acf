/// 將位元組數轉成易讀的大小字串 (B / KB / MB / GB)
pub fn format_file_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = size_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", size, UNITS[unit])
}

/// 計算壓縮後節省的空間，回傳 (節省位元組, 節省百分比)
pub fn savings_info(original_size: u64, compressed_size: u64) -> (i64, f64) {
    let saved_bytes = original_size as i64 - compressed_size as i64;
    let saved_percent = if original_size > 0 {
        saved_bytes as f64 / original_size as f64 * 100.0
    } else {
        0.0
    };
    (saved_bytes, saved_percent)
}
