//! picdeck - slide shows from folders of images
//!
//! Usage:
//!   picdeck build --output deck.pptx --dir photos      Build from every image in a folder
//!   picdeck build --output deck.pptx a.png b.jpg       Build from the given images
//!   picdeck template starter.pptx                      Write the starter template
//!   picdeck validate deck.pptx                         Check a finished deck

use clap::{Parser, Subcommand};
use picdeck::ooxml::pptx::{validate_package, write_starter_template};
use picdeck::slideshow::{BuildError, DeckOptions, Result, build, discover_images};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "picdeck", version, about = "Build PowerPoint slide shows from images")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a deck with one slide per image
    Build {
        /// Output .pptx file (overwritten)
        #[arg(short, long)]
        output: PathBuf,
        /// Template presentation; a starter template is written next to the output when omitted
        #[arg(short, long)]
        template: Option<PathBuf>,
        /// Take every supported image directly inside this folder
        #[arg(short, long, conflicts_with = "images")]
        dir: Option<PathBuf>,
        /// Options file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Skip validating the finished deck
        #[arg(long)]
        no_validate: bool,
        /// Images, in slide order
        images: Vec<PathBuf>,
    },
    /// Write the starter template
    Template {
        /// Output .pptx file
        output: PathBuf,
    },
    /// Check a deck and list structural findings
    Validate {
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Build {
            output,
            template,
            dir,
            config,
            no_validate,
            images,
        } => cmd_build(&output, template, dir, config, no_validate, images),
        Commands::Template { output } => {
            write_starter_template(&output)?;
            info!(output = %output.display(), "wrote starter template");
            Ok(ExitCode::SUCCESS)
        },
        Commands::Validate { file } => {
            let findings = validate_package(&file)?;
            for finding in &findings {
                println!("{}", finding);
            }
            if findings.is_empty() {
                info!(file = %file.display(), "no findings");
                Ok(ExitCode::SUCCESS)
            } else {
                warn!(file = %file.display(), findings = findings.len(), "deck has structural problems");
                Ok(ExitCode::from(2))
            }
        },
    }
}

fn cmd_build(
    output: &Path,
    template: Option<PathBuf>,
    dir: Option<PathBuf>,
    config: Option<PathBuf>,
    no_validate: bool,
    images: Vec<PathBuf>,
) -> Result<ExitCode> {
    let mut options = match config {
        Some(path) => DeckOptions::from_yaml_file(path)?,
        None => DeckOptions::default(),
    };
    if no_validate {
        options.validate = false;
    }

    let images = match dir {
        Some(dir) => discover_images(&dir)?,
        None => images,
    };
    if images.is_empty() {
        warn!("no images given; the deck will have no slides");
    }

    let template = match template {
        Some(path) => path,
        None => {
            let path = starter_path(output)?;
            if !path.exists() {
                write_starter_template(&path)?;
                info!(template = %path.display(), "wrote starter template");
            }
            path
        },
    };

    let total = images.len();
    let mut done = 0usize;
    let report = build(output, &template, &images, &options, &mut || {
        done += 1;
        info!("slide {}/{}", done, total);
    })?;

    for finding in &report.findings {
        warn!("{}", finding);
    }
    info!(
        output = %output.display(),
        slides = report.slides.len(),
        "slide show created"
    );

    Ok(ExitCode::SUCCESS)
}

/// `template.pptx` in the output's folder.
fn starter_path(output: &Path) -> Result<PathBuf> {
    let dir = output.parent().unwrap_or_else(|| Path::new(""));
    let path = dir.join("template.pptx");
    if path == output {
        return Err(BuildError::Template(format!(
            "cannot generate the starter template over the output {}",
            output.display()
        )));
    }
    Ok(path)
}
