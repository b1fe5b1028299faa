use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use pixtune::{
    format_file_size, generate_output_path, size_change_percent, Cli, Commands,
    CompressionSettings, EnhanceSettings, ImageProcessor, ProcessConfig, ProcessedImageResult,
    ResizeSettings,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let mut config = ProcessConfig {
        max_input_bytes: Some(cli.max_input_size),
        ..Default::default()
    };

    match cli.command {
        Commands::Info { input } => process_info(&input, config),
        Commands::Resize {
            input,
            output,
            width,
            height,
            keep_aspect,
            algorithm,
        } => {
            config.algorithm = algorithm.into();
            process_resize(&input, output, width, height, keep_aspect, config)
        }
        Commands::Compress {
            input,
            output,
            quality,
            format,
            no_optimize,
        } => {
            config.optimize_png = !no_optimize;
            let settings = CompressionSettings {
                quality,
                format: format.into(),
            };
            process_compress(&input, output, settings, config)
        }
        Commands::Enhance {
            input,
            output,
            target,
            format,
            start_quality,
            seed,
        } => {
            config.start_quality = start_quality;
            config.noise_seed = seed;
            let settings = EnhanceSettings {
                target_size_kb: target,
                format: format.into(),
            };
            process_enhance(&input, output, settings, config)
        }
    }
}

fn build_processor(config: ProcessConfig) -> anyhow::Result<ImageProcessor> {
    config.validate()?;
    Ok(ImageProcessor::new(config))
}

fn process_info(input: &Path, config: ProcessConfig) -> anyhow::Result<()> {
    let processor = build_processor(config)?;
    let data = processor.read_input(input)?;
    let info = processor
        .inspect(&data)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("=== Image Information ===");
    println!("File: {}", input.display());
    println!("Size: {}", format_file_size(info.file_size));
    println!(
        "Dimensions: {} x {} pixels",
        info.dimensions.width, info.dimensions.height
    );
    println!("Aspect Ratio: {:.2}:1", info.dimensions.aspect_ratio());
    println!("Format: {}", info.format);
    println!("Has EXIF metadata: {}", info.has_exif);

    Ok(())
}

fn process_resize(
    input: &Path,
    output: Option<PathBuf>,
    width: Option<u32>,
    height: Option<u32>,
    keep_aspect: bool,
    config: ProcessConfig,
) -> anyhow::Result<()> {
    let processor = build_processor(config)?;
    let data = processor.read_input(input)?;
    let original = processor.probe(&data)?;

    let settings = match (width, height) {
        (Some(w), Some(h)) => ResizeSettings::new(w, h, keep_aspect),
        (Some(w), None) => ResizeSettings::from_width(original, w, keep_aspect),
        (None, Some(h)) => ResizeSettings::from_height(original, h, keep_aspect),
        (None, None) => bail!("Specify --width, --height, or both"),
    };
    settings.validate()?;

    let result = run_with_spinner("Resizing", || processor.resize(&data, &settings))?;
    write_result(input, output, data.len() as u64, &result)
}

fn process_compress(
    input: &Path,
    output: Option<PathBuf>,
    settings: CompressionSettings,
    config: ProcessConfig,
) -> anyhow::Result<()> {
    settings.validate()?;
    let processor = build_processor(config)?;
    let data = processor.read_input(input)?;

    let result = run_with_spinner("Compressing", || processor.compress(&data, &settings))?;
    write_result(input, output, data.len() as u64, &result)
}

fn process_enhance(
    input: &Path,
    output: Option<PathBuf>,
    settings: EnhanceSettings,
    config: ProcessConfig,
) -> anyhow::Result<()> {
    let processor = build_processor(config)?;
    let data = processor.read_input(input)?;

    let result = run_with_spinner("Enhancing", || processor.enhance(&data, &settings))?;
    if result.size() < settings.target_bytes() {
        log::warn!(
            "Output is {} short of the {} KB target",
            format_file_size(settings.target_bytes() - result.size()),
            settings.target_size_kb
        );
    }
    write_result(input, output, data.len() as u64, &result)
}

fn run_with_spinner<T>(
    message: &'static str,
    operation: impl FnOnce() -> pixtune::Result<T>,
) -> anyhow::Result<T> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = operation();
    spinner.finish_and_clear();

    Ok(result?)
}

fn write_result(
    input: &Path,
    output: Option<PathBuf>,
    original_size: u64,
    result: &ProcessedImageResult,
) -> anyhow::Result<()> {
    let output_path = generate_output_path(input, output.as_deref(), result.format());
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output_path, result.bytes())
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!("Saved: {}", output_path.display());
    println!(
        "Dimensions: {} x {} pixels, format: {} ({})",
        result.width(),
        result.height(),
        result.format(),
        result.format().mime_type()
    );
    if let Some(quality) = result.quality() {
        println!("Quality: {:.0}%", quality * 100.0);
    }
    println!(
        "Size: {} -> {} ({:+.1}%)",
        format_file_size(original_size),
        format_file_size(result.size()),
        size_change_percent(original_size, result.size())
    );

    Ok(())
}
