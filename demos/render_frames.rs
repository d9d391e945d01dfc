//! Render a short animation to numbered PNG frames
//!
//! Usage: `cargo run --example render_frames -- [frames] [out_dir]`
//! Set `RUST_LOG=triangle_field=debug` for per-stage logging.

use std::path::PathBuf;

use triangle_field::*;

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut args = std::env::args().skip(1);
    let frames: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(30);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "frames".to_string()));
    std::fs::create_dir_all(&out_dir)?;

    println!("=== triangle_field frame render ===\n");

    let config = FieldConfigBuilder::new()
        .seed(12345)
        .slices(180)
        .movement_speed(240)?
        .side(Side::Double)
        .build()?;

    println!("  Seed: {}", config.seed);
    println!("  Points: {}", config.mesh.slices);
    println!("  Segment frames: {}", config.motion.frames);

    let mut animator = Animator::new(config, 640, 360)?;

    // Sweep the pointer across the middle of the view
    let mut written = 0;
    let mut result = Ok(());
    animator.run(|animator| {
        let x = 640.0 * written as f64 / frames.max(1) as f64;
        animator.set_pointer(x, 180.0);

        let path = out_dir.join(format!("frame_{:04}.png", written));
        result = animator.snapshot().and_then(|frame| frame.save(&path));
        written += 1;
        result.is_ok() && written < frames
    });
    result?;

    println!("\nWrote {} frames to {}", written, out_dir.display());
    Ok(())
}
