use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "newsreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose keyframes and write them as PNG stills.
    Frames(FramesArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input job JSON.
    #[arg(long)]
    job: PathBuf,

    /// Directory receiving `frame_01.png`, `frame_02.png`, ...
    #[arg(long)]
    out_dir: PathBuf,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input job JSON.
    #[arg(long)]
    job: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Background audio track; overrides the job's `audio` field.
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Engine configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// One render request as read from disk. Relative paths resolve against the job file.
#[derive(serde::Deserialize, Debug)]
struct Job {
    #[serde(flatten)]
    article: newsreel::ArticleContent,
    #[serde(default)]
    images: Vec<JobImage>,
    #[serde(default)]
    audio: Option<PathBuf>,
}

#[derive(serde::Deserialize, Debug)]
struct JobImage {
    path: PathBuf,
    #[serde(default = "default_selected")]
    selected: bool,
}

fn default_selected() -> bool {
    true
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frames(args) => cmd_frames(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn read_job(path: &Path) -> anyhow::Result<(Job, PathBuf)> {
    let f = File::open(path).with_context(|| format!("open job '{}'", path.display()))?;
    let job: Job = serde_json::from_reader(BufReader::new(f)).with_context(|| "parse job JSON")?;
    let root = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    Ok((job, root))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<newsreel::EngineConfig> {
    let mut config = match path {
        Some(p) => newsreel::EngineConfig::from_path(p)?,
        None => newsreel::EngineConfig::default(),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

fn image_refs(job: &Job, root: &Path) -> Vec<newsreel::ImageRef> {
    job.images
        .iter()
        .map(|img| newsreel::ImageRef {
            source: newsreel::ImageSource::from_path(root.join(&img.path)),
            selected: img.selected,
        })
        .collect()
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let (job, root) = read_job(&args.job)?;
    let config = load_config(args.config.as_deref())?;
    let mut engine = newsreel::Engine::new(config)?;

    let images = image_refs(&job, &root);
    let paths = engine.preview(&job.article, &images, &args.out_dir)?;
    for p in &paths {
        println!("{}", p.display());
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (job, root) = read_job(&args.job)?;
    let config = load_config(args.config.as_deref())?;
    let mut engine = newsreel::Engine::new(config)?;

    let images = image_refs(&job, &root);
    let audio = args.audio.or_else(|| job.audio.as_ref().map(|a| root.join(a)));
    let cancel = newsreel::CancelToken::new();
    let video = engine.render(&job.article, &images, audio.as_deref(), &args.out, &cancel)?;

    println!(
        "{} ({:.2}s, {} frames, audio: {})",
        video.file_path.display(),
        video.duration_seconds,
        video.frame_count,
        if video.has_audio { "yes" } else { "no" }
    );
    Ok(())
}
