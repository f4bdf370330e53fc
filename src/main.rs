use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use pagetree::layout::generator::{GeneratorConfig, TreeGenerator};
use pagetree::pipeline::{build_dataset, export_dataset, load_faces, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "pagetree")]
#[command(version, about = "Synthetic document pages with layout ground truth", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args, Debug, Clone)]
struct LayoutArgs {
    /// Seed for the first page; page N uses seed + N
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Splits forced above every leaf
    #[arg(long, default_value_t = 1)]
    min_depth: u32,

    /// Splits allowed above any leaf
    #[arg(long, default_value_t = 3)]
    max_depth: u32,

    /// Smallest font size in pixels
    #[arg(long, default_value_t = 8)]
    min_font_size: u32,

    /// Largest font size in pixels
    #[arg(long, default_value_t = 16)]
    max_font_size: u32,

    /// Largest tilt of a text block in degrees (0 disables rotation)
    #[arg(long, default_value_t = 0.0)]
    max_rotation: f32,

    /// Characters of random text per text block
    #[arg(long, default_value_t = 3000)]
    text_length: usize,

    /// TrueType/OpenType font files; the built-in block face when omitted
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,
}

impl LayoutArgs {
    fn generator_config(&self) -> Result<GeneratorConfig> {
        if self.min_depth > self.max_depth {
            anyhow::bail!(
                "--min-depth ({}) must not exceed --max-depth ({})",
                self.min_depth,
                self.max_depth
            );
        }
        if self.min_font_size == 0 || self.min_font_size > self.max_font_size {
            anyhow::bail!(
                "invalid font size range {}..={}",
                self.min_font_size,
                self.max_font_size
            );
        }
        if !self.max_rotation.is_finite() {
            anyhow::bail!("--max-rotation must be finite, got {}", self.max_rotation);
        }
        Ok(GeneratorConfig {
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            font_sizes: (self.min_font_size, self.max_font_size),
            max_rotation: self.max_rotation,
            text_length: self.text_length,
            ..GeneratorConfig::default()
        })
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render random pages and write their ground truth
    Generate {
        /// Output directory
        #[arg(short, long, default_value = "pagetree_output")]
        output: PathBuf,

        /// Number of pages
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Page width in pixels
        #[arg(long, default_value_t = 1800)]
        width: u32,

        /// Page height in pixels
        #[arg(long, default_value_t = 1000)]
        height: u32,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Keep page images in color instead of grayscale
        #[arg(long)]
        color: bool,

        /// Enable debug outputs (overlay images, tree outlines)
        #[arg(short, long)]
        debug: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the layout tree a seed produces
    Describe {
        #[command(flatten)]
        layout: LayoutArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Commands::Generate {
            output,
            count,
            width,
            height,
            layout,
            color,
            debug,
            quiet,
        } => {
            let config = PipelineConfig {
                output,
                pages: count,
                width,
                height,
                seed: layout.seed,
                fonts: layout.fonts.clone(),
                debug,
                grayscale: !color,
                generator: layout.generator_config()?,
            };
            generate(config, quiet)
        }
        Commands::Describe { layout } => describe(&layout),
    }
}

fn generate(config: PipelineConfig, quiet: bool) -> Result<()> {
    if config.pages == 0 {
        anyhow::bail!("Nothing to generate: --count is 0");
    }
    if config.width == 0 || config.height == 0 {
        anyhow::bail!("Page size must be positive: {}x{}", config.width, config.height);
    }

    if !quiet {
        println!("[*] Generating {} page(s)", config.pages);
        println!("[*] Output: {}", config.output.display());
        println!("[*] Size: {}x{}, seed {}", config.width, config.height, config.seed);
    }

    let dataset = build_dataset(&config)
        .with_context(|| format!("Failed to generate pages into: {}", config.output.display()))?;

    if !quiet {
        println!("[+] Exporting ground truth...");
    }

    export_dataset(&dataset, &config.output)
        .with_context(|| format!("Failed to export to: {}", config.output.display()))?;

    if !quiet {
        let regions: usize = dataset.pages.iter().map(|page| page.regions.len()).sum();
        println!(
            "\n[✓] Done! {} page(s), {} region(s) saved to: {}",
            dataset.pages.len(),
            regions,
            config.output.display()
        );
    }

    Ok(())
}

fn describe(layout: &LayoutArgs) -> Result<()> {
    let faces = load_faces(&layout.fonts)?;
    let generator = TreeGenerator::new(layout.generator_config()?, faces);
    let tree = generator
        .generate(&mut StdRng::seed_from_u64(layout.seed))
        .context("Failed to build layout")?;

    println!("Layout (seed {})", layout.seed);
    println!("=================");
    print!("{tree}");
    println!("Leaves: {}", tree.leaf_count());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> LayoutArgs {
        let mut argv = vec!["pagetree", "describe"];
        argv.extend_from_slice(args);
        let cli = Cli::parse_from(argv);
        match cli.command {
            Commands::Describe { layout } => layout,
            Commands::Generate { .. } => unreachable!(),
        }
    }

    #[test]
    fn rejects_non_finite_rotation() {
        let err = parse(&["--max-rotation", "inf"]).generator_config().unwrap_err();
        assert!(err.to_string().contains("--max-rotation must be finite"));
        assert!(parse(&["--max-rotation", "12.5"]).generator_config().is_ok());
    }

    #[test]
    fn rejects_inverted_depth_range() {
        assert!(parse(&["--min-depth", "4", "--max-depth", "2"])
            .generator_config()
            .is_err());
    }
}
