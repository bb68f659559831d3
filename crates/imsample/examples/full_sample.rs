//! Example: sample every pixel of a grayscale image, optionally masked.
//!
//! Loads an 8-bit PNG, optionally a second PNG used as a binary mask (any
//! nonzero pixel is inside), and runs `ImageFullSampler` over the image or
//! a `--region` of it. Mask pixels map onto image pixels one to one unless
//! `--mask-shift` moves the mask in world space.
//!
//! Samples are written to a JSON file next to the input image. Timing for
//! both the single-threaded reference and the configured run is printed to
//! stdout.
//!
//! Run from the workspace root:
//!   RUST_LOG=debug cargo run -p imsample --example full_sample -- --help
//!   cargo run -p imsample --example full_sample -- --input data/part.png --mask data/roi.png

use std::time::Instant;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use image::ImageReader;
use imsample::{
    AffineTransform, BinaryImageMask, FullSamplerConfig, Image, ImageFullSampler, ImageRegion,
    ImageSample, RayonDispatcher, SpatialMask, Vector, available_concurrency,
};
use serde::Serialize;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Sample every pixel of a grayscale image, optionally inside a mask")]
struct Args {
    /// Path to the input PNG
    #[arg(long)]
    input: String,

    /// Optional mask PNG; nonzero pixels are inside
    #[arg(long)]
    mask: Option<String>,

    /// World-space shift applied to the mask, as "dx,dy"
    #[arg(long, value_delimiter = ',', num_args = 2)]
    mask_shift: Option<Vec<f64>>,

    /// Run everything on the calling thread
    #[arg(long)]
    single_thread: bool,

    /// Number of work units (default: available concurrency)
    #[arg(long)]
    units: Option<usize>,

    /// Worker threads in the pool (default: available concurrency)
    #[arg(long)]
    threads: Option<usize>,

    /// Scan the full image even when the mask is smaller
    #[arg(long)]
    no_crop: bool,

    /// Optional sub-region as "x,y,width,height"
    #[arg(long, value_delimiter = ',', num_args = 4)]
    region: Option<Vec<usize>>,

    /// Output JSON path (default: <input stem>_samples.json next to input)
    #[arg(long)]
    out: Option<String>,
}

// ── JSON DTOs ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SampleDto {
    x: f64,
    y: f64,
    value: f64,
}

#[derive(Serialize)]
struct RunResult {
    width: usize,
    height: usize,
    masked: bool,
    /// Upper bound on the work units used; the split may produce fewer.
    work_units: usize,
    /// Wall-clock time of the configured run, in milliseconds.
    elapsed_ms: f64,
    /// Wall-clock time of the single-threaded reference run, in milliseconds.
    reference_ms: f64,
    samples: Vec<SampleDto>,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load_gray(path: &str) -> Result<Image<u8, 2>> {
    let gray = ImageReader::open(path)
        .with_context(|| format!("opening {path}"))?
        .decode()
        .with_context(|| format!("decoding {path}"))?
        .into_luma8();
    let size = [gray.width() as usize, gray.height() as usize];
    Image::from_vec(size, gray.into_raw()).with_context(|| format!("building image from {path}"))
}

fn load_mask(path: &str, shift: Option<&[f64]>) -> Result<BinaryImageMask<2>> {
    let image = load_gray(path)?;
    match shift {
        Some(&[dx, dy]) => {
            let placement = AffineTransform::translation(Vector::new([dx, dy]));
            BinaryImageMask::with_object_to_world(image, placement)
                .with_context(|| format!("placing mask {path}"))
        }
        _ => Ok(BinaryImageMask::new(image)),
    }
}

fn to_dto(samples: &[ImageSample<2>]) -> Vec<SampleDto> {
    samples
        .iter()
        .map(|s| SampleDto {
            x: s.point.coords[0],
            y: s.point.coords[1],
            value: s.value,
        })
        .collect()
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let img_path = &args.input;
    let out_path = args.out.clone().unwrap_or_else(|| {
        let p = std::path::Path::new(img_path);
        let stem = p.file_stem().unwrap_or_default().to_string_lossy();
        let dir = p.parent().unwrap_or(std::path::Path::new("."));
        dir.join(format!("{stem}_samples.json"))
            .to_string_lossy()
            .into_owned()
    });

    let image = load_gray(img_path)?;
    let [width, height] = *image.size();
    println!("loaded {img_path}: {width}x{height}");

    let mask = args
        .mask
        .as_deref()
        .map(|path| load_mask(path, args.mask_shift.as_deref()))
        .transpose()?;
    if let Some(path) = &args.mask {
        println!("mask: {path}");
    }
    let mask_ref = mask.as_ref().map(|m| m as &dyn SpatialMask<2>);

    let region = match args.region.as_deref() {
        Some(&[x, y, w, h]) => Some(ImageRegion::new([x, y], [w, h])),
        Some(other) => anyhow::bail!("--region takes 4 values, got {}", other.len()),
        None => None,
    };

    let threads = args.threads.unwrap_or_else(available_concurrency);
    ensure!(threads > 0, "--threads must be > 0");
    let dispatcher = RayonDispatcher::new(threads).context("building worker pool")?;

    let config = FullSamplerConfig {
        use_multi_thread: !args.single_thread,
        number_of_work_units: args.units.unwrap_or(threads),
        crop_to_mask: !args.no_crop,
    };
    println!(
        "config: multi_thread={}, units={}, threads={threads}, crop_to_mask={}",
        config.use_multi_thread, config.number_of_work_units, config.crop_to_mask
    );
    let work_units = if config.use_multi_thread {
        config.number_of_work_units.clamp(1, threads)
    } else {
        1
    };

    let reference = ImageFullSampler::new(
        FullSamplerConfig {
            use_multi_thread: false,
            ..config.clone()
        },
        dispatcher.clone(),
    );
    let t0 = Instant::now();
    let expected = reference
        .sample(&image, region, mask_ref)
        .context("single-threaded reference run")?;
    let reference_ms = t0.elapsed().as_secs_f64() * 1e3;

    let sampler = ImageFullSampler::new(config, dispatcher);
    let t0 = Instant::now();
    let samples = sampler
        .sample(&image, region, mask_ref)
        .context("sampling image")?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    ensure!(
        samples == expected,
        "configured run differs from the single-threaded reference"
    );
    log::info!("{} samples match the single-threaded reference", samples.len());

    println!(
        "{} samples  ({elapsed_ms:.2} ms, reference {reference_ms:.2} ms)",
        samples.len()
    );

    let result = RunResult {
        width,
        height,
        masked: mask.is_some(),
        work_units,
        elapsed_ms,
        reference_ms,
        samples: to_dto(&samples),
    };

    let out_file =
        std::fs::File::create(&out_path).with_context(|| format!("creating {out_path}"))?;
    serde_json::to_writer_pretty(out_file, &result)
        .with_context(|| format!("writing JSON to {out_path}"))?;

    println!("results written to {out_path}");
    Ok(())
}
