//! Animate a field with each backend, then export a high-resolution SVG
//!
//! Usage: `cargo run --example export_svg --features serde`

use triangle_field::*;

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = FieldConfigBuilder::new()
        .seed(7)
        .slices(120)
        .mesh_ambient("#1a1a40")?
        .mesh_diffuse("#ffffff")?
        .light_ambient("#999999")?
        .light_diffuse("#ff6633")?
        .border_opacity(0.4)?
        .export_size(1920, 1080)?
        .renderer(RendererKind::Raster)
        .build()?;

    #[cfg(feature = "serde")]
    {
        let json = serde_json::to_string_pretty(&config).unwrap_or_default();
        println!("Config:\n{}\n", json);
    }

    let mut animator = Animator::new(config, 800, 450)?;

    for kind in [RendererKind::Raster, RendererKind::Shader, RendererKind::Vector] {
        animator.set_renderer(kind);
        animator.step(20);
        let snapshot = animator.snapshot()?;
        let path = format!("field_{:?}.{}", kind, snapshot.extension()).to_lowercase();
        snapshot.save(&path)?;
        println!("{:?}: {} triangles -> {}", kind, animator.field().triangles().len(), path);
    }

    let export = animator.export_default()?;
    export.save("field_export.svg")?;
    println!(
        "Exported {}x{} -> field_export.svg",
        animator.config().export.width,
        animator.config().export.height
    );

    Ok(())
}
