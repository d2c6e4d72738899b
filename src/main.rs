use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

use handscript::app::{ConversionEvent, ConversionJob, ConversionOrchestrator};
use handscript::engine::layout::CancelCheck;
use handscript::engine::params::{LayoutOptions, Parameters, ResourcePaths};
use handscript::engine::preview::PreviewEngine;
use handscript::engine::wrap::WrapStrategy;
use handscript::platform::io::{DocumentAdapter, PlainTextAdapter};
use handscript::platform::renderer::{BackgroundTemplate, FontGlyphRenderer, PreviewRenderer};
use handscript::platform::{font, preset};

const FONT_DIR: &str = "fonts";
const BACKGROUND_DIR: &str = "Background";

#[derive(Parser)]
#[command(name = "handscript")]
#[command(author, version, about = "Render text files as handwritten pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a text file into page images
    Convert {
        /// Input document (.txt)
        input: PathBuf,

        /// Directory that receives handwritten_<name>/
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        resources: ResourceArgs,

        /// Wrap by estimated character count instead of measured widths
        #[arg(long = "estimated-wrap")]
        estimated_wrap: bool,

        /// Check for cancellation before every line
        #[arg(long = "cancel-per-line")]
        cancel_per_line: bool,

        /// Rotate glyph bitmaps by the sampled angle
        #[arg(long = "apply-rotation")]
        apply_rotation: bool,
    },

    /// Render a scaled preview image
    Preview {
        /// Optional document; without it a sample text is shown
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Preview page (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Where to save the preview
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,

        #[command(flatten)]
        resources: ResourceArgs,
    },

    /// Write the default parameters to the preset file
    Defaults {
        /// Preset file
        #[arg(long, default_value = preset::DEFAULT_PRESET_PATH)]
        preset: PathBuf,

        /// Print to stdout instead of writing the file
        #[arg(long)]
        print: bool,
    },
}

#[derive(Args)]
struct ResourceArgs {
    /// Font file (.ttf/.otf); defaults to the first one in ./fonts
    #[arg(long)]
    font: Option<PathBuf>,

    /// Background template; defaults to the first image in ./Background
    #[arg(long)]
    background: Option<PathBuf>,

    /// Parameter preset (JSON); created with defaults if missing
    #[arg(long, default_value = preset::DEFAULT_PRESET_PATH)]
    preset: PathBuf,

    /// Seed for the jitter; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

impl ResourceArgs {
    fn resolve(&self) -> Result<(ResourcePaths, Parameters)> {
        let font_path = match &self.font {
            Some(path) => path.clone(),
            None => first_candidate(font::font_candidates(Path::new(FONT_DIR))?)
                .or_else(font::find_system_font)
                .context("no font given and none found in ./fonts")?,
        };
        let background_path = match &self.background {
            Some(path) => path.clone(),
            None => first_candidate(font::background_candidates(Path::new(BACKGROUND_DIR))?)
                .context("no background given and none found in ./Background")?,
        };
        let params = preset::load_or_init(&self.preset)?;
        log::info!(target: "main", "font {}, background {}", font_path.display(), background_path.display());
        Ok((
            ResourcePaths {
                font_path,
                background_path,
            },
            params,
        ))
    }
}

fn first_candidate(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().next()
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert {
            input,
            output,
            resources,
            estimated_wrap,
            cancel_per_line,
            apply_rotation,
        } => {
            let (paths, params) = resources.resolve()?;
            let options = LayoutOptions {
                wrap: if estimated_wrap {
                    WrapStrategy::Estimated
                } else {
                    WrapStrategy::Measured
                },
                cancel_check: if cancel_per_line {
                    CancelCheck::Line
                } else {
                    CancelCheck::Paragraph
                },
                apply_rotation,
            };
            convert(ConversionJob {
                input,
                output_dir: output,
                resources: paths,
                params,
                options,
                seed: resources.seed,
            })
        }
        Commands::Preview {
            input,
            page,
            output,
            resources,
        } => preview(input.as_deref(), page, &output, &resources),
        Commands::Defaults { preset: path, print } => {
            let params = Parameters::default();
            if print {
                println!("{}", serde_json::to_string_pretty(&params)?);
            } else {
                preset::save(&path, &params)?;
                println!("wrote {}", path.display());
            }
            Ok(())
        }
    }
}

fn convert(job: ConversionJob) -> Result<()> {
    let mut handle = ConversionOrchestrator::spawn(job);
    while let Some(event) = handle.recv() {
        match event {
            ConversionEvent::Progress { percent, message } => {
                println!("[{percent:>3}%] {message}");
            }
            ConversionEvent::Finished(_) => break,
        }
    }

    let outcome = handle.join();
    if !outcome.success() {
        bail!("{}", outcome.message());
    }
    println!("{}", outcome.message());
    Ok(())
}

fn preview(input: Option<&Path>, page: usize, output: &Path, resources: &ResourceArgs) -> Result<()> {
    let (paths, params) = resources.resolve()?;
    params.validate()?;

    let template = BackgroundTemplate::open(&paths.background_path)?;
    let renderer = FontGlyphRenderer::open(&paths.font_path)?;

    let mut engine = match input {
        Some(path) => {
            let text = PlainTextAdapter.read_text(path)?;
            PreviewEngine::with_text(params, template.size(), &text)
        }
        None => PreviewEngine::sample(params, template.size()),
    };
    if let Some(pages) = engine.pages_mut() {
        if !pages.go_to(page.saturating_sub(1)) {
            bail!("page {} is out of range (1..={})", page, pages.len());
        }
        println!("page {}/{}", pages.current_index() + 1, pages.len());
    }

    let rng = match resources.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let plan = engine.plan(rng);
    let image = PreviewRenderer::new(&template, &renderer).render(&plan)?;
    image
        .save(output)
        .with_context(|| format!("failed to save preview {}", output.display()))?;
    println!("wrote {}", output.display());
    Ok(())
}
