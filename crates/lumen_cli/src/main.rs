//! lumen command line front end.
//!
//! Loads a scene description, runs the renderer and encodes the
//! resulting color buffer as a PNG.

mod scene_file;

use anyhow::Context;
use clap::Parser;
use image::{Rgb, RgbImage};
use log::LevelFilter;
use lumen_renderer::{ColorBuffer, Renderer};
use scene_file::SceneFile;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "A Monte Carlo path tracer")]
struct Args {
    /// Scene description file
    #[arg(short, long, default_value = "scenes/demo.json")]
    scene: PathBuf,

    /// Output image path
    #[arg(short, long, default_value = "render.png")]
    output: PathBuf,

    /// Override image width in pixels
    #[arg(long)]
    width: Option<usize>,

    /// Override samples per pixel
    #[arg(long)]
    samples: Option<u32>,

    /// Override maximum bounce depth
    #[arg(long)]
    depth: Option<u32>,

    /// Override worker thread count
    #[arg(long)]
    threads: Option<usize>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let mut file = SceneFile::load(&args.scene)
        .with_context(|| format!("loading scene {}", args.scene.display()))?;
    apply_overrides(&mut file.render, &args);
    let (camera, scene, config) = file.build()?;

    let start = std::time::Instant::now();
    let buffer = Renderer::new(camera, scene, config).render()?;
    log::info!("rendered in {:?}", start.elapsed());

    let image = buffer_to_image(&buffer);
    image
        .save(&args.output)
        .with_context(|| format!("saving image {}", args.output.display()))?;
    log::info!("saved {}", args.output.display());

    Ok(())
}

/// Apply command line overrides to the scene file's render settings.
///
/// Runs before `build()` so the camera's viewport width follows an
/// overridden image width.
fn apply_overrides(render: &mut scene_file::RenderDesc, args: &Args) {
    if let Some(width) = args.width {
        render.width = width;
    }
    if let Some(samples) = args.samples {
        render.samples_per_pixel = samples;
    }
    if let Some(depth) = args.depth {
        render.max_depth = depth;
    }
    if let Some(threads) = args.threads {
        render.threads = Some(threads);
    }
}

/// Convert the buffer to an image, flipping rows: the buffer's row 0
/// is the bottom of the picture, the image format's is the top.
fn buffer_to_image(buffer: &ColorBuffer) -> RgbImage {
    let (width, height) = (buffer.width(), buffer.height());
    let mut image = RgbImage::new(width as u32, height as u32);

    for y in 0..height {
        for x in 0..width {
            let rgb = buffer.read(x, y);
            image.put_pixel(x as u32, (height - 1 - y) as u32, Rgb(rgb));
        }
    }

    image
}
