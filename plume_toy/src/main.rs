// Copyright 2025 the Plume Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render an SVG document to a PNG image.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use plume_common::color::{parse_color, Color, ParsedColor};
use plume_common::kurbo::Affine;
use plume_cpu::{Canvas, Surface, TextureKind};
use plume_svg::Document;

#[derive(Parser, Debug)]
#[command(about, version)]
struct Args {
    /// The SVG document to render
    input: PathBuf,
    /// Where to write the PNG; defaults to the input path with a `.png` extension
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Output width in pixels
    #[arg(long)]
    width: Option<u32>,
    /// Output height in pixels
    #[arg(long)]
    height: Option<u32>,
    /// Render only the element with this id
    #[arg(long)]
    id: Option<String>,
    /// The CSS color used for `currentColor`
    #[arg(long, value_parser = css_color, default_value = "black")]
    current_color: Color,
    /// A CSS color to fill the image with before drawing
    #[arg(long, value_parser = css_color)]
    background: Option<Color>,
}

fn css_color(s: &str) -> Result<Color, String> {
    match parse_color(s) {
        Ok(ParsedColor::Color(color)) => Ok(color),
        Ok(ParsedColor::CurrentColor) => Err("`currentColor` is not allowed here".to_owned()),
        Err(err) => Err(err.to_string()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let document = Document::load_from_file(&args.input, None, None)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let mut surface = document
        .render_to_surface(
            args.id.as_deref(),
            args.width,
            args.height,
            args.current_color,
            None,
        )
        .context("failed to render the document")?;

    if let Some(background) = args.background {
        surface = underlay(surface, background)?;
    }

    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("png"));
    surface
        .write_to_png_path(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        "wrote {}x{} image to {}",
        surface.width(),
        surface.height(),
        output.display()
    );
    Ok(())
}

/// Draw `surface` over a solid `background`.
fn underlay(surface: Surface, background: Color) -> Result<Surface> {
    let (width, height) = (surface.width(), surface.height());
    let mut target = Surface::new(width, height)?;
    target.clear(background);
    let mut canvas = Canvas::new(target);
    canvas.set_texture(Arc::new(surface), TextureKind::Plain, 1.0, Affine::IDENTITY);
    canvas.paint();
    Ok(canvas.into_surface())
}
