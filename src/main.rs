use std::ffi::OsStr;
use std::path::{ Path, PathBuf };
use std::process;
use std::time::Instant;

use clap::Parser;

use whitted_ray_tracer::consts::DEFAULT_THREADS;
use whitted_ray_tracer::error::Result;
use whitted_ray_tracer::render;
use whitted_ray_tracer::scene::Scene;
use whitted_ray_tracer::texture::TextureSet;

/// Renders a scene description to a PPM image.
#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    /// The scene description file, keyword text (.txt) or JSON (.json).
    scene: PathBuf,

    /// Directory the rendered image is written to.
    #[clap(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Worker thread count; 1 renders on the main thread.
    #[clap(short, long)]
    threads: Option<usize>,
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(error) = run(&args) {
        log::error!("{}", error);
        eprintln!("error: {}", error);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let started = Instant::now();

    let scene = Scene::from_file(&args.scene)?;
    log::info!(
        "loaded scene: {} spheres, {} triangles, {} lights",
        scene.spheres.len(),
        scene.faces.len(),
        scene.lights.len()
    );

    // Texture paths resolve relative to the scene file.
    let base_dir = args.scene.parent().unwrap_or_else(|| Path::new("."));
    let textures = TextureSet::load(&scene.texture_files, base_dir)?;

    let threads = args.threads.unwrap_or(DEFAULT_THREADS);
    let canvas = if threads <= 1 {
        render::render(&scene, &textures)?
    } else {
        render::render_parallel(scene, textures, threads)?
    };

    let out_path = output_path(&args.scene, &args.out_dir);
    canvas.save(&out_path)?;

    log::info!("render took {:.2?}", started.elapsed());
    println!("Saved render to {}.", out_path.display());

    Ok(())
}

/// The output image path: the scene file's stem with a .ppm extension,
/// placed in the output directory.
fn output_path(scene: &Path, out_dir: &Path) -> PathBuf {
    let stem = scene.file_stem().unwrap_or_else(|| OsStr::new("render"));
    out_dir.join(stem).with_extension("ppm")
}
