/// Diagnostic tool to verify tree → layout → render pipeline without a window
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use dendroview_rs::config::ViewerConfig;
use dendroview_rs::layout::{compute_layout, DrawCommand, Size};
use dendroview_rs::render::raster::render_to_canvas;
use dendroview_rs::render::text::{TextRenderer, DEFAULT_FONT};
use dendroview_rs::tree::sample::seeded_binary_tree;
use dendroview_rs::tree::ResponseNode;
use dendroview_rs::ui::viewport::{ViewportEvent, ViewportTransform};

#[derive(Parser, Debug)]
#[command(name = "debug-layout", about = "Print dendrogram draw commands")]
struct Args {
    /// JSON tree to lay out; a seeded sample tree is used when omitted
    #[arg(long)]
    tree: Option<PathBuf>,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=16))]
    levels: u32,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 1024)]
    width: u32,

    #[arg(long, default_value_t = 768)]
    height: u32,

    /// Also rasterize the fitted dendrogram into this PPM file
    #[arg(long)]
    ppm: Option<PathBuf>,

    /// Print every command instead of the first 20
    #[arg(long)]
    all: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dendroview_rs=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = ViewerConfig::load_or_default(args.config.as_deref())?;

    println!("=== DIAGNOSTIC: Tree → Layout Pipeline ===");

    let response = match &args.tree {
        Some(path) => ResponseNode::from_json_file(path)?,
        None => seeded_binary_tree(args.levels, args.seed),
    };
    println!(
        "\n[1] Tree: root '{}', {} direct children",
        response.name.as_deref().unwrap_or("<unnamed>"),
        response.children().len()
    );

    let mut text_renderer = TextRenderer::new();
    let loaded = match &config.render.font_path {
        Some(path) => text_renderer.load_font_from_path(DEFAULT_FONT, path),
        None => text_renderer.load_system_font(DEFAULT_FONT),
    };
    if let Err(e) = loaded {
        println!("    (no font: {}; labels measured approximately)", e);
    }

    let canvas = Size::new(args.width as f32, args.height as f32);
    let layout = compute_layout(Some(&response), canvas, &config.layout, &mut text_renderer);

    println!(
        "\n[2] Layout: {} commands ({} lines, {} labels)",
        layout.commands.len(),
        layout.lines().count(),
        layout.labels().count()
    );
    println!(
        "    max depth {}, {} leaves, origin ({:.1}, {:.1})",
        layout.max_depth, layout.leaf_count, layout.origin.x, layout.origin.y
    );

    let shown = if args.all { layout.commands.len() } else { 20 };
    println!("\n[3] Commands:");
    for (i, command) in layout.commands.iter().take(shown).enumerate() {
        match command {
            DrawCommand::Line {
                from,
                to,
                kind,
                depth,
            } => println!(
                "    [{:>4}] {:?} line ({:.1}, {:.1}) -> ({:.1}, {:.1}) depth {}",
                i, kind, from.x, from.y, to.x, to.y, depth
            ),
            DrawCommand::Label {
                text,
                anchor,
                size,
                depth,
                ..
            } => println!(
                "    [{:>4}] label '{}' at ({:.1}, {:.1}) {:.1}x{:.1} depth {}",
                i, text, anchor.x, anchor.y, size.width, size.height, depth
            ),
        }
    }
    if layout.commands.len() > shown {
        println!("    ... {} more", layout.commands.len() - shown);
    }

    let content_width = layout.fit_width(&config.layout, config.viewport.padding);
    let transform = ViewportTransform::new(canvas)
        .apply(ViewportEvent::Fit { content_width }, &config.viewport);
    println!(
        "\n[4] Fit: content width {:.1} → scale {:.3}",
        content_width, transform.scale
    );

    if let Some(path) = &args.ppm {
        let style = config.render.style(config.layout.font_size);
        let image = render_to_canvas(
            &layout.commands,
            transform,
            &style,
            &mut text_renderer,
            args.width,
            args.height,
        );
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        image.write_ppm(BufWriter::new(file))?;
        println!("\n[5] Wrote {}x{} image to {}", args.width, args.height, path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_height_is_bounded() {
        assert!(Args::try_parse_from(["prog", "--levels", "16"]).is_ok());
        assert!(Args::try_parse_from(["prog", "--levels", "40"]).is_err());
        assert!(Args::try_parse_from(["prog", "--levels", "0"]).is_err());
    }
}
