// ============================================================================
// Desk CLI — headless scale / background / convert via command-line arguments
// ============================================================================
//
// Usage examples:
//   Desk --input photo.png --width 800 --height 600 --keep-aspect --output small.png
//   Desk -i shots/*.jpg --background "light lined" --output-dir out/
//   Desk --new 640x480 --background "dark checkered" --output paper.png
//
// No GUI is opened in CLI mode. Every file goes through the same
// settings-apply path the Settings dialog uses.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::canvas::CanvasState;
use crate::error::DeskResult;
use crate::io::{SaveFormat, encode_and_write, load_image_sync};
use crate::ops::background::BackgroundStyle;
use crate::ops::canvas_ops::{CanvasSettings, apply_canvas_settings};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// Desk headless image processor.
#[derive(Parser, Debug)]
#[command(
    name = "Desk",
    about = "Desk headless canvas processor",
    long_about = "Scale images, repaint their background and convert between PNG and\n\
                  JPEG without opening the GUI.\n\n\
                  Example:\n  \
                  Desk --input photo.png --width 800 --height 600 --keep-aspect -o out.png\n  \
                  Desk --new 640x480 --background \"light checkered\" -o paper.png"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, num_args = 1.., required_unless_present = "new")]
    pub input: Vec<String>,

    /// Start from a blank white canvas of this size instead of an input file.
    #[arg(long, value_name = "WxH", value_parser = parse_size, conflicts_with = "input")]
    pub new: Option<(u32, u32)>,

    /// Output file path. Only valid for a single job.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory; files keep their stem and get the format's extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Target width. Defaults to the image's own width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Target height. Defaults to the image's own height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Fit inside width × height instead of stretching to it.
    #[arg(long)]
    pub keep_aspect: bool,

    /// Repaint with a background: a color name or "light/dark checkered/lined".
    #[arg(short, long, value_name = "NAME", value_parser = parse_background)]
    pub background: Option<BackgroundStyle>,

    /// Output format: png or jpeg. Inferred from --output when omitted.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    /// Used by `main()` to route before creating an eframe window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i" || a == "--new")
    }
}

/// Parse "640x480" (or "640X480").
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w: u32 = w.trim().parse().map_err(|_| format!("bad width in '{}'", s))?;
    let h: u32 = h.trim().parse().map_err(|_| format!("bad height in '{}'", s))?;
    crate::canvas::check_dimensions(w, h).map_err(|e| e.to_string())?;
    Ok((w, h))
}

fn parse_background(s: &str) -> Result<BackgroundStyle, String> {
    BackgroundStyle::from_name(s).map_err(|e| e.to_string())
}

/// Where a job's starting canvas comes from.
#[derive(Clone, Debug, PartialEq)]
enum Source {
    File(PathBuf),
    Blank(u32, u32),
}

impl Source {
    fn stem(&self) -> Option<String> {
        match self {
            Source::File(path) => Some(path.file_stem()?.to_string_lossy().into_owned()),
            Source::Blank(..) => Some("canvas".to_string()),
        }
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    match run_jobs(&args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) | Err(_) => ExitCode::FAILURE,
    }
}

/// Process every job; returns the number of failed jobs, or `Err` with a
/// message when nothing could be started.
fn run_jobs(args: &CliArgs) -> Result<usize, String> {
    let sources: Vec<Source> = match args.new {
        Some((w, h)) => vec![Source::Blank(w, h)],
        None => resolve_inputs(&args.input).into_iter().map(Source::File).collect(),
    };
    if sources.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return Err("no inputs".into());
    }

    if sources.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        let msg = format!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            sources.len()
        );
        eprintln!("{}", msg);
        return Err(msg);
    }

    let format = match args.format.as_deref() {
        Some(name) => match SaveFormat::from_name(name) {
            Some(f) => f,
            None => {
                let msg = format!("error: unknown format '{}' (use png or jpeg).", name);
                eprintln!("{}", msg);
                return Err(msg);
            }
        },
        None => args
            .output
            .as_deref()
            .map(SaveFormat::from_path)
            .unwrap_or_default(),
    };

    if let Some(dir) = &args.output_dir
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        let msg = format!(
            "error: could not create output directory '{}': {}",
            dir.display(),
            e
        );
        eprintln!("{}", msg);
        return Err(msg);
    }

    let total = sources.len();
    let multi = total > 1;
    let mut failures = 0;

    for (idx, source) in sources.iter().enumerate() {
        let label = match source {
            Source::File(p) => p.display().to_string(),
            Source::Blank(w, h) => format!("new {}×{} canvas", w, h),
        };
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, label);
        }
        let file_start = Instant::now();

        let Some(output_path) = build_output_path(
            source,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            format,
        ) else {
            eprintln!("  error: cannot determine output path for '{}'.", label);
            failures += 1;
            continue;
        };

        match run_one(source, &output_path, args, format) {
            Ok(()) => {
                crate::log_info!("CLI: {} -> {}", label, output_path.display());
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                crate::log_err!("CLI: {} failed: {}", label, e);
                eprintln!("  error: {}", e);
                failures += 1;
            }
        }
    }

    Ok(failures)
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

fn run_one(source: &Source, output: &Path, args: &CliArgs, format: SaveFormat) -> DeskResult<()> {
    // -- Step 1: Load ----------------------------------------------------
    let mut state = match source {
        Source::File(path) => CanvasState::from_image(load_image_sync(path)?)?,
        Source::Blank(w, h) => CanvasState::new(*w, *h),
    };

    // -- Step 2: Settings apply ------------------------------------------
    let settings = CanvasSettings {
        width: args.width.unwrap_or(state.width),
        height: args.height.unwrap_or(state.height),
        keep_aspect: args.keep_aspect,
        background: args.background,
    };
    apply_canvas_settings(&mut state, &settings)?;

    // -- Step 3: Save ----------------------------------------------------
    encode_and_write(state.image(), output, format, args.quality.clamp(1, 100))
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Compute the output path for a single job.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: next to the input (or the working directory for `--new`),
///    appending `_out` to the stem if it would overwrite the input
fn build_output_path(
    source: &Source,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: SaveFormat,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = source.stem()?;

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    let (parent, input) = match source {
        Source::File(path) => (path.parent().unwrap_or(Path::new(".")), Some(path)),
        Source::Blank(..) => (Path::new("."), None),
    };
    let candidate = parent.join(format!("{}.{}", stem, ext));

    if input.is_some_and(|p| *p == candidate) {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::colors::NamedColor;
    use image::{Rgba, RgbaImage};

    fn args(argv: &[&str]) -> CliArgs {
        CliArgs::parse_from(std::iter::once("Desk").chain(argv.iter().copied()))
    }

    #[test]
    fn sizes_parse_both_separators() {
        assert_eq!(parse_size("640x480"), Ok((640, 480)));
        assert_eq!(parse_size("10X20"), Ok((10, 20)));
        assert!(parse_size("640").is_err());
        assert!(parse_size("0x5").is_err());
    }

    #[test]
    fn input_or_new_is_required() {
        let none = CliArgs::try_parse_from(["Desk", "--width", "10"]);
        assert!(none.is_err());
        let both = CliArgs::try_parse_from(["Desk", "-i", "a.png", "--new", "4x4"]);
        assert!(both.is_err());
        let bg = args(&["--new", "4x4", "--background", "dark lined"]);
        assert!(bg.background.is_some());
        assert!(CliArgs::try_parse_from(["Desk", "--new", "4x4", "-b", "plaid"]).is_err());
    }

    #[test]
    fn output_paths_avoid_overwriting_input() {
        let src = Source::File(PathBuf::from("dir/pic.png"));
        assert_eq!(
            build_output_path(&src, None, None, SaveFormat::Png),
            Some(PathBuf::from("dir/pic_out.png"))
        );
        assert_eq!(
            build_output_path(&src, None, None, SaveFormat::Jpeg),
            Some(PathBuf::from("dir/pic.jpg"))
        );
        assert_eq!(
            build_output_path(&src, None, Some(Path::new("out")), SaveFormat::Png),
            Some(PathBuf::from("out/pic.png"))
        );
    }

    #[test]
    fn batch_scales_every_matched_file() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png"] {
            RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 255]))
                .save(dir.path().join(name))
                .unwrap();
        }
        let out = dir.path().join("out");
        let pattern = format!("{}/*.png", dir.path().display());
        let cli = args(&[
            "-i",
            &pattern,
            "--output-dir",
            out.to_str().unwrap(),
            "--width",
            "10",
            "--height",
            "10",
            "--keep-aspect",
        ]);
        assert_eq!(run_jobs(&cli), Ok(0));
        for name in ["a.png", "b.png"] {
            let img = load_image_sync(&out.join(name)).unwrap();
            assert_eq!(img.dimensions(), (10, 5));
        }
    }

    #[test]
    fn new_canvas_gets_background() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("paper.png");
        let cli = args(&[
            "--new",
            "30x20",
            "--background",
            "green",
            "-o",
            out.to_str().unwrap(),
        ]);
        assert_eq!(run_jobs(&cli), Ok(0));
        let img = load_image_sync(&out).unwrap();
        assert_eq!(img.dimensions(), (30, 20));
        assert_eq!(*img.get_pixel(5, 5), NamedColor::Green.rgba());
    }

    #[test]
    fn unreadable_file_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.png");
        std::fs::write(&bogus, b"definitely not an image").unwrap();
        let out = dir.path().join("out");
        let cli = args(&[
            "-i",
            bogus.to_str().unwrap(),
            "--output-dir",
            out.to_str().unwrap(),
        ]);
        assert_eq!(run_jobs(&cli), Ok(1));
        assert!(!out.join("bogus.png").exists());
    }
}
