mod headless;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use walkdir::WalkDir;
use wave_render::{
    scramble_glyph, GlyphBitmap, LinePatternKind, LineRenderContext, ScrambledAtlas,
    ScrollBuffer, StaticGlyphs, WaveConfig, WordPool,
};

use crate::headless::MetricRasterizer;

const PROGRESS_TEMPLATE: &str = "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

#[derive(Parser, Debug)]
#[command(author, version, about = "Scramble glyphs and run the affirmation scroll field")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scramble one glyph image and write the result
    Scramble(ScrambleArgs),
    /// Build a scrambled glyph atlas from a directory of glyph images
    Atlas(AtlasArgs),
    /// Run the scroll field without a display and print what is on screen
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug)]
struct ScrambleArgs {
    /// Glyph image path
    input: PathBuf,
    /// Output image path
    #[arg(short, long)]
    output: PathBuf,
    #[command(flatten)]
    glyph: GlyphChoice,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct GlyphChoice {
    /// Character the image depicts
    #[arg(long = "char")]
    ch: Option<char>,
    /// Unicode codepoint the image depicts
    #[arg(long)]
    codepoint: Option<u32>,
}

#[derive(Parser, Debug)]
struct AtlasArgs {
    /// Directory of glyph images named by character or decimal codepoint
    input: PathBuf,
    /// Output atlas image path
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Affirmation text file, or a directory of them
    #[arg(long)]
    affirmations: Option<PathBuf>,
    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the configured line pattern
    #[arg(long)]
    pattern: Option<LinePatternKind>,
    /// Screen width in pixels
    #[arg(long, default_value_t = 1920)]
    width: u32,
    /// Screen height in pixels
    #[arg(long, default_value_t = 1080)]
    height: u32,
    /// Simulated duration in seconds
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,
    /// Simulated frames per second
    #[arg(long, default_value_t = 60.0)]
    fps: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scramble(args) => scramble(args),
        Commands::Atlas(args) => atlas(args),
        Commands::Simulate(args) => simulate(args),
    }
}

fn scramble(args: ScrambleArgs) -> Result<()> {
    let codepoint = match (args.glyph.ch, args.glyph.codepoint) {
        (Some(ch), _) => ch as u32,
        (None, Some(codepoint)) => codepoint,
        (None, None) => bail!("either --char or --codepoint is required"),
    };

    let mut image = image::open(&args.input)
        .with_context(|| format!("failed to open glyph {:?}", args.input))?
        .into_rgba8();
    if !scramble_glyph(&mut image, codepoint) {
        warn!("{:?} is too small to scramble; writing it unchanged", args.input);
    }

    image.save(&args.output).with_context(|| format!("failed to write {:?}", args.output))?;
    info!("scrambled U+{codepoint:04X} into {:?}", args.output);
    Ok(())
}

fn atlas(args: AtlasArgs) -> Result<()> {
    let entries = files_under(&args.input)?;
    let progress = progress_bar(entries.len() as u64, "glyphs")?;

    let mut glyphs = StaticGlyphs::new();
    for entry in entries {
        progress.inc(1);
        let Some(ch) = glyph_char(&entry) else {
            warn!("skipping {:?}: name is not a character or codepoint", entry);
            continue;
        };
        let image = image::open(&entry)
            .with_context(|| format!("failed to open glyph {:?}", entry))?
            .into_rgba8();
        let advance = image.width();
        glyphs.insert(GlyphBitmap { ch, image, advance });
    }
    progress.finish_and_clear();

    if glyphs.is_empty() {
        bail!("no glyph images found in {:?}", args.input);
    }

    let chars: Vec<char> = glyphs.chars().collect();
    let atlas = ScrambledAtlas::build(&mut glyphs, chars);
    let (width, height) = atlas.image().dimensions();
    atlas
        .into_image()
        .save(&args.output)
        .with_context(|| format!("failed to write atlas {:?}", args.output))?;

    info!("wrote {width}x{height} atlas to {:?}", args.output);
    Ok(())
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            WaveConfig::load(path).with_context(|| format!("failed to load settings {:?}", path))?
        },
        None => WaveConfig::default(),
    };
    if let Some(pattern) = args.pattern {
        config.line_pattern = pattern;
    }

    let pool = match &args.affirmations {
        Some(path) => load_affirmations(path)?,
        None => WordPool::default(),
    }
    .or_fallback();
    info!("loaded {} affirmation words", pool.len());

    let rasterizer = MetricRasterizer::new(config.base_font_size);
    let context = LineRenderContext::from_advances(
        args.width,
        args.height,
        config.font_scale(),
        rasterizer.advances(),
    );
    let mut buffer = ScrollBuffer::new(rasterizer, pool.into_words(), &config, context)
        .context("failed to build scroll field")?;

    let fps = if args.fps.is_finite() && args.fps > 0.0 { args.fps } else { 60.0 };
    let frames = (args.seconds.max(0.0) * fps).round() as u64;
    let dt = 1.0 / fps;

    let progress = progress_bar(frames, "frames")?;
    for _ in 0..frames {
        buffer.update(dt);
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!(
        "after {frames} frames: velocity {:.1} px/s, {} lines retired, {} live handles",
        buffer.velocity().velocity(),
        buffer.retired_lines(),
        buffer.rasterizer().live_handles(),
    );
    for line in buffer.visible_lines() {
        println!("{:>6} | {}", line.y(), line.text());
    }

    buffer.shutdown();
    println!(
        "shut down: {} of {} handles still live",
        buffer.rasterizer().live_handles(),
        buffer.rasterizer().issued_handles()
    );
    Ok(())
}

fn load_affirmations(path: &Path) -> Result<WordPool> {
    let files = if path.is_dir() { files_under(path)? } else { vec![path.to_path_buf()] };
    WordPool::load_all(&files).with_context(|| format!("failed to read affirmations {:?}", path))
}

/// Regular files under `path`, sorted by name.
fn files_under(path: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect();
    entries.sort();
    if entries.is_empty() {
        bail!("no files found in {:?}", path);
    }
    Ok(entries)
}

/// A file stem of one character names that character; otherwise it is a decimal codepoint.
fn glyph_char(path: &Path) -> Option<char> {
    let stem = path.file_stem()?.to_str()?;
    let mut chars = stem.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => stem.parse::<u32>().ok().and_then(char::from_u32),
    }
}

fn progress_bar(len: u64, unit: &'static str) -> Result<ProgressBar> {
    let progress = ProgressBar::new(len);
    progress.set_style(
        ProgressStyle::with_template(PROGRESS_TEMPLATE)
            .context("invalid progress template")?
            .progress_chars("=> "),
    );
    progress.set_message(unit);
    Ok(progress)
}
