use crate::config::CliConfig;
use crate::core::discovery::{strip_quotes, FileQueue};
use crate::domain::model::{OutputFormat, Quality};
use std::io::{self, BufRead, Write};

fn read_line<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// 互動模式：依序詢問格式、品質與路徑，填入 `base` 後回傳。
/// 路徑可以輸入多行，空白行結束；找到的圖片會累加到佇列中。
pub fn prompt_config<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    mut base: CliConfig,
) -> io::Result<CliConfig> {
    let default_format = OutputFormat::parse(&base.format).unwrap_or_default();

    writeln!(writer, "=== Image Compressor ===")?;
    writeln!(writer)?;
    writeln!(writer, "Choose the output format:")?;
    for (i, format) in OutputFormat::ALL.iter().enumerate() {
        writeln!(
            writer,
            "{}. {} ({}) - {}",
            i + 1,
            format.name(),
            format.extension(),
            format.description()
        )?;
    }
    write!(
        writer,
        "Enter a number (1-4) or press Enter for {}: ",
        default_format
    )?;
    writer.flush()?;

    let format = OutputFormat::from_menu_choice(&read_line(reader)?, default_format);
    writeln!(writer, "Selected format: {}", format)?;
    base.format = format.name().to_string();

    write!(
        writer,
        "\nEnter quality (0-100) or press Enter for the default ({}): ",
        base.quality
    )?;
    writer.flush()?;
    let quality = read_line(reader)?;
    if !quality.is_empty() {
        match quality.parse::<u8>().map_err(|e| e.to_string()).and_then(|q| {
            Quality::new(q).map_err(|e| e.to_string())
        }) {
            Ok(q) => {
                base.quality = q.value();
                writeln!(writer, "Quality set to: {}", q)?;
            }
            Err(e) => {
                writeln!(writer, "Invalid quality value: {}", e)?;
                writeln!(writer, "Using the default ({}).", base.quality)?;
            }
        }
    }

    writeln!(
        writer,
        "\nEnter files or directories, one per line. An empty line starts compression."
    )?;
    let mut queue = FileQueue::new();
    loop {
        write!(writer, "Path: ")?;
        writer.flush()?;
        let line = read_line(reader)?;
        if line.is_empty() {
            break;
        }

        let result = queue.add(&[strip_quotes(&line)]);
        for missing in &result.missing {
            writeln!(writer, "Path not found: {}", missing.display())?;
        }
        writeln!(
            writer,
            "Added {} image(s), {} in queue",
            result.added, result.total
        )?;
    }

    base.inputs = queue
        .files()
        .iter()
        .map(|path| path.display().to_string())
        .collect();
    Ok(base)
}

/// 等待使用者按下 Enter，讓主控台視窗不會立刻關閉
pub fn wait_for_enter(message: &str) {
    print!("{}", message);
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
}
