use std::env;

use imageops_smartcrop::{
    crop_by_gridding, merge_copy_preserving_alpha, CropAlgorithm, GaussianBlurExt,
    GridCropParams, SlicingCropParams, SmartCropExt, SIMULATION_OPACITY,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 6 {
        eprintln!(
            "Usage: {} <input_image> <slicing|gridding|simulate> <width> <height> <output_image>",
            args[0]
        );
        eprintln!("Example: {} input.png gridding 200 200 output.png", args[0]);
        eprintln!("Set RUST_LOG=trace to see per-cell entropy");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let width: u32 = args[3].parse().map_err(|_| "Invalid width")?;
    let height: u32 = args[4].parse().map_err(|_| "Invalid height")?;
    let output_path = &args[5];

    let algorithm = match args[2].as_str() {
        "slicing" => CropAlgorithm::Slicing(SlicingCropParams::default()),
        "gridding" => CropAlgorithm::Gridding(GridCropParams::default()),
        "simulate" => CropAlgorithm::Gridding(GridCropParams {
            simulate: true,
            ..GridCropParams::default()
        }),
        other => return Err(format!("Unknown algorithm: {other}").into()),
    };

    let img = image::open(input_path)?.to_rgba8();
    println!("Processing RGBA8 image: {}x{}", img.width(), img.height());

    // a light blur keeps sensor noise from dominating the entropy
    let smoothed = img.gaussian_blur(1, None)?;
    let region = smoothed.smart_crop_region(width, height, &algorithm)?;
    let (x, y, crop_width, crop_height) = region.region();
    println!("Selected region: {crop_width}x{crop_height} at ({x}, {y})");

    let result = match algorithm {
        CropAlgorithm::Gridding(ref params) if params.simulate => {
            // search on the smoothed image, draw on the original
            let outcome = crop_by_gridding(&smoothed, width, height, params)?;
            println!(
                "Grid search: {} iterations, stopped by {:?}",
                outcome.iterations, outcome.termination
            );
            let mut preview = img.clone();
            if let Some(overlay) = outcome.overlay {
                let size = preview.dimensions();
                merge_copy_preserving_alpha(
                    &mut preview,
                    &overlay,
                    (0, 0),
                    (0, 0),
                    size,
                    SIMULATION_OPACITY,
                )?;
            }
            preview
        }
        _ => image::imageops::crop_imm(&img, x, y, crop_width, crop_height).to_image(),
    };

    let pixel_count = result.pixels().filter(|p| p[3] > 0).count();
    println!("Visible pixels in output: {pixel_count}");

    result.save(output_path)?;
    println!("Saved result to: {output_path}");

    Ok(())
}
