use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use captioner::{
    CaptionSession, Color, ExportFormat, FileStore, FontBook, NoticeKind, StyleConfig, TextAlign,
};

#[derive(Parser, Debug)]
#[command(name = "captioner", version, about = "Add stacked caption bands beneath an image")]
struct Cli {
    /// Directory holding preferences and recent images.
    /// Defaults to `$CAPTIONER_HOME`, then `~/.captioner`.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Extra font file to load (repeatable).
    #[arg(long = "font", global = true)]
    fonts: Vec<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a preview of the captioned image without recording it.
    Render(RenderArgs),
    /// Generate the captioned image, record it in the recent list and save it.
    Generate(GenerateArgs),
    /// Inspect or prune the recent-image list.
    #[command(subcommand)]
    Recent(RecentCommand),
    /// Inspect or reset stored style preferences.
    #[command(subcommand)]
    Prefs(PrefsCommand),
    /// List font families available for captions.
    Fonts,
}

#[derive(Args, Debug)]
struct ImageArgs {
    /// Source image.
    #[arg(long)]
    image: PathBuf,
}

#[derive(Args, Debug, Default)]
struct StyleArgs {
    /// Style JSON (camelCase `StyleConfig` fields); flags below override it.
    #[arg(long)]
    style: Option<PathBuf>,
    /// Caption text; `\n` separates lines.
    #[arg(long, conflicts_with_all = ["text_file", "template"])]
    text: Option<String>,
    /// Read the caption text from a file.
    #[arg(long, conflicts_with = "template")]
    text_file: Option<PathBuf>,
    /// Use built-in caption template 1-4.
    #[arg(long)]
    template: Option<usize>,
    /// Font size in pixels.
    #[arg(long)]
    font_size: Option<u32>,
    /// Font stack, e.g. "Impact, Arial".
    #[arg(long)]
    font_family: Option<String>,
    /// Text fill color.
    #[arg(long, value_parser = parse_color)]
    font_color: Option<Color>,
    /// Outline color.
    #[arg(long, value_parser = parse_color)]
    outline_color: Option<Color>,
    /// Outline width in pixels; 0 disables the outline.
    #[arg(long)]
    outline_width: Option<u32>,
    /// Band tint.
    #[arg(long, value_parser = parse_color)]
    background_color: Option<Color>,
    /// Band opacity in percent.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    background_opacity: Option<u8>,
    /// Band height as a multiple of the font size.
    #[arg(long)]
    line_height: Option<f64>,
    /// Line alignment: left, center or right.
    #[arg(long, value_parser = parse_align)]
    align: Option<TextAlign>,
    /// Blur radius for the band backdrop.
    #[arg(long)]
    blur: Option<u32>,
    /// Store the resulting style as preferences.
    #[arg(long)]
    save_prefs: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    image: ImageArgs,
    #[command(flatten)]
    style: StyleArgs,
    /// Output file.
    #[arg(long)]
    out: PathBuf,
    /// Output format: png, jpg or jpeg:<quality>. Guessed from `--out` when omitted.
    #[arg(long)]
    format: Option<ExportFormat>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    image: ImageArgs,
    #[command(flatten)]
    style: StyleArgs,
    /// Directory the `caption_<millis>.<ext>` file is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Output format: png, jpg or jpeg:<quality>.
    #[arg(long, default_value = "png")]
    format: ExportFormat,
}

#[derive(Subcommand, Debug)]
enum RecentCommand {
    /// List recent images, newest first.
    List,
    /// Delete the recent image at an index.
    Delete {
        /// 0-based index as printed by `recent list`.
        index: usize,
    },
    /// Write a recent image to a file.
    Show {
        /// 0-based index as printed by `recent list`.
        index: usize,
        /// Output file.
        #[arg(long)]
        out: PathBuf,
        /// Write the original upload instead of the captioned image.
        #[arg(long)]
        source: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PrefsCommand {
    /// Print stored preferences as JSON.
    Show,
    /// Forget stored preferences.
    Reset,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store_dir = match &cli.store {
        Some(dir) => dir.clone(),
        None => default_store_dir()?,
    };
    let store = FileStore::open(&store_dir)?;

    let mut fonts = FontBook::with_system_fonts();
    for path in &cli.fonts {
        fonts.load_font_file(path)?;
    }

    let mut session = CaptionSession::new(store, fonts);
    let result = match cli.cmd {
        Command::Render(args) => cmd_render(&mut session, args),
        Command::Generate(args) => cmd_generate(&mut session, args),
        Command::Recent(cmd) => cmd_recent(&mut session, cmd),
        Command::Prefs(cmd) => cmd_prefs(&mut session, cmd),
        Command::Fonts => cmd_fonts(&mut session),
    };
    report_notices(&mut session);
    result
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_store_dir() -> anyhow::Result<PathBuf> {
    if let Some(dir) = std::env::var_os("CAPTIONER_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .context("no home directory; pass --store or set CAPTIONER_HOME")?;
    Ok(PathBuf::from(home).join(".captioner"))
}

fn report_notices(session: &mut CaptionSession) {
    for notice in session.drain_notices() {
        if notice.kind != NoticeKind::Error {
            eprintln!("{}", notice.message);
        }
    }
}

fn parse_color(s: &str) -> Result<Color, String> {
    s.parse().map_err(|e: captioner::CaptionError| e.to_string())
}

fn parse_align(s: &str) -> Result<TextAlign, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "left" => Ok(TextAlign::Left),
        "center" | "centre" => Ok(TextAlign::Center),
        "right" => Ok(TextAlign::Right),
        other => Err(format!("unknown alignment '{other}'")),
    }
}

fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        _ => "application/octet-stream",
    }
}

fn load_image(session: &mut CaptionSession, args: &ImageArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("read image '{}'", args.image.display()))?;
    let name = args
        .image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    session.load_image_bytes(&name, guess_mime(&args.image), bytes)?;
    Ok(())
}

fn build_style(base: &StyleConfig, args: &StyleArgs) -> anyhow::Result<StyleConfig> {
    let mut style = match &args.style {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read style '{}'", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("parse style '{}'", path.display()))?
        }
        None => base.clone(),
    };

    if let Some(text) = &args.text {
        style.caption_text = text.replace("\\n", "\n");
    }
    if let Some(path) = &args.text_file {
        style.caption_text = std::fs::read_to_string(path)
            .with_context(|| format!("read text '{}'", path.display()))?;
    }
    if let Some(v) = args.font_size {
        style.font_size_px = v;
    }
    if let Some(v) = &args.font_family {
        style.font_family = v.clone();
    }
    if let Some(v) = args.font_color {
        style.font_color = v;
    }
    if let Some(v) = args.outline_color {
        style.outline_color = v;
    }
    if let Some(v) = args.outline_width {
        style.outline_width_px = v;
    }
    if let Some(v) = args.background_color {
        style.background_color = v;
    }
    if let Some(v) = args.background_opacity {
        style.background_opacity_pct = v;
    }
    if let Some(v) = args.line_height {
        style.line_height_multiple = v;
    }
    if let Some(v) = args.align {
        style.text_align = v;
    }
    if let Some(v) = args.blur {
        style.backdrop_blur_px = v;
    }
    Ok(style)
}

fn apply_style(session: &mut CaptionSession, args: &StyleArgs) -> anyhow::Result<()> {
    let style = build_style(session.style(), args)?;
    session.set_style(style)?;
    if let Some(n) = args.template {
        session.apply_template(n)?;
    }
    if args.save_prefs {
        session.save_preferences()?;
    }
    Ok(())
}

fn format_for_path(path: &Path) -> ExportFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => ExportFormat::Jpeg {
            quality: captioner::DEFAULT_JPEG_QUALITY,
        },
        _ => ExportFormat::Png,
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

fn cmd_render(session: &mut CaptionSession, args: RenderArgs) -> anyhow::Result<()> {
    load_image(session, &args.image)?;
    apply_style(session, &args.style)?;
    let surface = session
        .preview()?
        .context("no image loaded")?;
    let format = args.format.unwrap_or_else(|| format_for_path(&args.out));
    let bytes = captioner::encode_surface(surface, format)?;
    write_file(&args.out, &bytes)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_generate(session: &mut CaptionSession, args: GenerateArgs) -> anyhow::Result<()> {
    load_image(session, &args.image)?;
    apply_style(session, &args.style)?;
    session.generate()?;
    let exported = session.save(args.format)?;
    let path = exported.write_to_dir(&args.out_dir)?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_recent(session: &mut CaptionSession, cmd: RecentCommand) -> anyhow::Result<()> {
    match cmd {
        RecentCommand::List => {
            for (i, r) in session.recent().iter().enumerate() {
                let first_line = captioner::caption_lines(&r.style_snapshot.caption_text)
                    .first()
                    .copied()
                    .unwrap_or("");
                let when = r
                    .timestamp
                    .format(&time::format_description::well_known::Rfc3339)
                    .context("format timestamp")?;
                println!("{i}\t{}\t{when}\t{first_line}", r.id);
            }
        }
        RecentCommand::Delete { index } => {
            session.delete_recent(index)?;
        }
        RecentCommand::Show { index, out, source } => {
            let record = session
                .recent()
                .get(index)
                .with_context(|| format!("no recent image at index {index}"))?;
            let uri = if source {
                &record.source_image
            } else {
                &record.rendered_image
            };
            let (_, bytes) = captioner::parse_data_uri(uri)?;
            write_file(&out, &bytes)?;
            eprintln!("wrote {}", out.display());
        }
    }
    Ok(())
}

fn cmd_prefs(session: &mut CaptionSession, cmd: PrefsCommand) -> anyhow::Result<()> {
    match cmd {
        PrefsCommand::Show => {
            let json = serde_json::to_string_pretty(&session.style().preferences())
                .context("serialize preferences")?;
            println!("{json}");
        }
        PrefsCommand::Reset => session.clear_preferences()?,
    }
    Ok(())
}

fn cmd_fonts(session: &mut CaptionSession) -> anyhow::Result<()> {
    for family in session.compositor_mut().fonts().families() {
        println!("{family}");
    }
    Ok(())
}
