// pixtune/src/utils/mod.rs
use crate::core::OutputFormat;
use std::path::{Path, PathBuf};

/// Default output location for a processed image: `processed_<stem>.<ext>`
/// next to the input, with the extension taken from the result format.
pub fn generate_output_path(
    input_path: &Path,
    output: Option<&Path>,
    format: OutputFormat,
) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => {
            let stem = input_path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(|name| name.split('.').next())
                .filter(|stem| !stem.is_empty())
                .unwrap_or("image");

            let filename = sanitize_filename(&format!("processed_{}.{}", stem, format.extension()));
            input_path.with_file_name(filename)
        }
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.ln() / base.ln()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

/// Signed change from `original` to `processed` in percent; negative means smaller.
pub fn size_change_percent(original: u64, processed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }

    (processed as f64 - original as f64) / original as f64 * 100.0
}

pub fn sanitize_filename(filename: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
    filename
        .chars()
        .map(|c| if invalid_chars.contains(&c) { '_' } else { c })
        .collect()
}

pub fn image_format_to_string(format: image::ImageFormat) -> String {
    match format {
        image::ImageFormat::Jpeg => "JPEG",
        image::ImageFormat::Png => "PNG",
        image::ImageFormat::Gif => "GIF",
        image::ImageFormat::WebP => "WebP",
        image::ImageFormat::Tiff => "TIFF",
        image::ImageFormat::Bmp => "BMP",
        _ => "Unknown",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sizes() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.00 B");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3072.00 GB");
    }

    #[test]
    fn size_change_is_signed() {
        assert_eq!(size_change_percent(200, 100), -50.0);
        assert_eq!(size_change_percent(100, 250), 150.0);
        assert_eq!(size_change_percent(0, 10), 0.0);
    }

    #[test]
    fn output_path_uses_first_name_segment() {
        let path = generate_output_path(Path::new("/tmp/photo.final.png"), None, OutputFormat::Jpeg);
        assert_eq!(path, PathBuf::from("/tmp/processed_photo.jpg"));
    }

    #[test]
    fn explicit_output_wins() {
        let path = generate_output_path(
            Path::new("in.png"),
            Some(Path::new("out/custom.webp")),
            OutputFormat::Png,
        );
        assert_eq!(path, PathBuf::from("out/custom.webp"));
    }

    #[test]
    fn dotfile_falls_back_to_default_stem() {
        let path = generate_output_path(Path::new(".hidden"), None, OutputFormat::WebP);
        assert_eq!(path, PathBuf::from("processed_image.webp"));
    }

    #[test]
    fn sanitizes_reserved_characters() {
        assert_eq!(sanitize_filename("a:b*c?.png"), "a_b_c_.png");
    }
}
