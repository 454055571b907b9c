//! Map composition: base layer, markers, color bar, and summary overlay.
//!
//! All sizes are expressed at a 2400 px reference width and scaled with
//! the configured width.

use daily_quakes_quake_models::{DailySummary, EarthquakeEvent, MagnitudeBucket};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::caption::{LONG_DATE_FORMAT, format_magnitude};
use crate::land::LandLayer;
use crate::palette::{self, Rgb};
use crate::projection::{Projection, Viewport};
use crate::text::{self, GLYPH_SIZE};
use crate::{MAX_WIDTH, MIN_WIDTH, RenderError, RenderOptions, RenderedMap};

const REFERENCE_WIDTH: f32 = 2400.0;

const BACKGROUND: Rgb = Rgb(0, 0, 0);
const GRATICULE: Rgb = Rgb(70, 70, 70);
const OUTLINE: Rgb = Rgb(255, 255, 255);
const TEXT: Rgb = Rgb(255, 255, 255);
const DIM_TEXT: Rgb = Rgb(170, 170, 170);

/// Degrees between graticule lines.
const GRATICULE_STEP: usize = 30;

/// Degrees between vertices along a graticule line.
const GRATICULE_DENSITY: usize = 2;

/// Loads the configured land outlines (or the built-in ones) and renders
/// the map.
///
/// # Errors
///
/// Returns [`RenderError`] if the land asset cannot be loaded or the image
/// cannot be produced.
pub fn render(
    events: &[EarthquakeEvent],
    summary: &DailySummary,
    options: &RenderOptions,
) -> Result<RenderedMap, RenderError> {
    let land = match options.land_geojson.as_deref() {
        Some(path) => LandLayer::load(path)?,
        None => LandLayer::builtin()?,
    };
    render_map(events, summary, options, Some(&land))
}

/// Renders one day of events onto a world map.
///
/// An empty event list renders the base layer with a "no activity" notice.
///
/// # Errors
///
/// Returns [`RenderError::Canvas`] for an unsupported width and
/// [`RenderError::Encode`] if PNG encoding fails.
pub fn render_map(
    events: &[EarthquakeEvent],
    summary: &DailySummary,
    options: &RenderOptions,
    land: Option<&LandLayer>,
) -> Result<RenderedMap, RenderError> {
    let width = options.width;
    let height = options.height();
    let canvas_error = || RenderError::Canvas { width, height };

    if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
        return Err(canvas_error());
    }
    let mut pixmap = Pixmap::new(width, height).ok_or_else(canvas_error)?;
    pixmap.fill(color(BACKGROUND, 255));

    let layout = Layout::new(width, height, options.projection);

    draw_graticule(&mut pixmap, &layout);
    if let Some(land) = land {
        draw_land(&mut pixmap, &layout, land);
    }
    let drawn = draw_markers(&mut pixmap, &layout, events, options.min_display_magnitude);
    draw_color_bar(&mut pixmap, &layout);
    draw_summary(&mut pixmap, &layout, summary, options);

    if summary.is_empty() {
        draw_no_activity(&mut pixmap, &layout);
    }

    log::debug!(
        "Rendered {width}x{height} map with {drawn} of {} markers",
        events.len()
    );

    let png = pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(e.to_string()))?;

    Ok(RenderedMap { png, width, height })
}

/// Pixel geometry shared by every drawing step.
struct Layout {
    projection: Projection,
    viewport: Viewport,
    width: f32,
    height: f32,
    scale: f32,
    margin: f32,
    text_scale: u32,
}

impl Layout {
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn new(width: u32, height: u32, projection: Projection) -> Self {
        let width = width as f32;
        let height = height as f32;
        let scale = width / REFERENCE_WIDTH;
        let margin = 40.0 * scale;

        let map_width = 2.0f32.mul_add(-margin, width);
        let map_height = map_width / projection.aspect_ratio() as f32;

        Self {
            projection,
            viewport: Viewport {
                x: margin,
                y: (height - map_height) / 2.0,
                width: map_width,
                height: map_height,
            },
            width,
            height,
            scale,
            margin,
            text_scale: ((2.0 * scale).round() as u32).max(1),
        }
    }

    fn to_pixel(&self, longitude: f64, latitude: f64) -> (f32, f32) {
        self.viewport
            .to_pixel(self.projection.project(longitude, latitude))
    }

    #[allow(clippy::cast_precision_loss)]
    fn line_height(&self, text_scale: u32) -> f32 {
        (GLYPH_SIZE * text_scale) as f32 * 1.5
    }
}

fn color(rgb: Rgb, alpha: u8) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(rgb.0, rgb.1, rgb.2, alpha)
}

fn paint(rgb: Rgb, alpha: u8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb.0, rgb.1, rgb.2, alpha);
    paint.anti_alias = true;
    paint
}

fn stroke_polyline(
    pixmap: &mut Pixmap,
    layout: &Layout,
    points: impl IntoIterator<Item = (f64, f64)>,
    paint: &Paint<'_>,
    stroke: &Stroke,
) {
    let mut builder = PathBuilder::new();
    for (i, (lon, lat)) in points.into_iter().enumerate() {
        let (x, y) = layout.to_pixel(lon, lat);
        if i == 0 {
            builder.move_to(x, y);
        } else {
            builder.line_to(x, y);
        }
    }
    if let Some(path) = builder.finish() {
        pixmap.stroke_path(&path, paint, stroke, Transform::identity(), None);
    }
}

fn draw_graticule(pixmap: &mut Pixmap, layout: &Layout) {
    let paint = paint(GRATICULE, 255);
    let stroke = Stroke {
        width: layout.scale.max(1.0),
        ..Stroke::default()
    };

    for lon in (-180_i32..=180).step_by(GRATICULE_STEP) {
        let points = (-90_i32..=90)
            .step_by(GRATICULE_DENSITY)
            .map(|lat| (f64::from(lon), f64::from(lat)));
        stroke_polyline(pixmap, layout, points, &paint, &stroke);
    }

    for lat in (-60_i32..=60).step_by(GRATICULE_STEP) {
        let points = (-180_i32..=180)
            .step_by(GRATICULE_DENSITY)
            .map(|lon| (f64::from(lon), f64::from(lat)));
        stroke_polyline(pixmap, layout, points, &paint, &stroke);
    }
}

fn draw_land(pixmap: &mut Pixmap, layout: &Layout, land: &LandLayer) {
    let paint = paint(OUTLINE, 255);
    let stroke = Stroke {
        width: (1.5 * layout.scale).max(1.0),
        ..Stroke::default()
    };

    for polyline in &land.polylines {
        stroke_polyline(pixmap, layout, polyline.iter().copied(), &paint, &stroke);
    }
}

/// Draws markers weakest first so the strongest end up on top. Returns
/// the number of markers drawn.
fn draw_markers(
    pixmap: &mut Pixmap,
    layout: &Layout,
    events: &[EarthquakeEvent],
    min_display_magnitude: f64,
) -> usize {
    let mut visible: Vec<(&EarthquakeEvent, f64)> = events
        .iter()
        .filter_map(|event| event.magnitude.map(|m| (event, m)))
        .filter(|&(_, m)| m >= min_display_magnitude)
        .collect();
    // Stable: equal magnitudes keep input order.
    visible.sort_by(|a, b| a.1.total_cmp(&b.1));

    for &(event, magnitude) in &visible {
        let (x, y) = layout.to_pixel(event.longitude, event.latitude);
        let radius = palette::marker_radius(magnitude) * layout.scale;
        if let Some(circle) = PathBuilder::from_circle(x, y, radius) {
            let paint = paint(palette::magnitude_color(magnitude), 255);
            pixmap.fill_path(
                &circle,
                &paint,
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    visible.len()
}

#[allow(clippy::cast_precision_loss)]
fn draw_color_bar(pixmap: &mut Pixmap, layout: &Layout) {
    let text_scale = layout.text_scale;
    let glyph = (GLYPH_SIZE * text_scale) as f32;
    let bar_width = 24.0 * layout.scale;
    let bin_height = 24.0 * layout.scale;
    let bar_right = layout.width - layout.margin;
    let bar_left = bar_right - bar_width;
    let bar_bottom = layout.height - layout.margin;

    for bin in 0..palette::BINS {
        let top = (bin + 1) as f32;
        let rect = Rect::from_xywh(
            bar_left,
            top.mul_add(-bin_height, bar_bottom),
            bar_width,
            bin_height,
        );
        if let Some(rect) = rect {
            let paint = paint(palette::bin_color(bin), 255);
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }

    let bar_top = (palette::BINS as f32).mul_add(-bin_height, bar_bottom);
    let label_x = bar_left - glyph * 1.5;
    let max_label = format!("{}", palette::MAX_MAGNITUDE);
    text::draw_text(pixmap, &max_label, label_x, bar_top, text_scale, TEXT);
    text::draw_text(pixmap, "0", label_x, bar_bottom - glyph, text_scale, TEXT);

    let title = "Magnitude";
    let title_x = bar_right - text::text_width(title, text_scale) as f32;
    let title_y = glyph.mul_add(-1.5, bar_top);
    text::draw_text(pixmap, title, title_x, title_y, text_scale, TEXT);
}

/// Overlay lines: `(text, scale multiplier, color)`.
fn summary_lines(summary: &DailySummary, options: &RenderOptions) -> Vec<(String, u32, Rgb)> {
    let mut lines = vec![
        ("Earthquakes".to_string(), 2, TEXT),
        (summary.date.format(LONG_DATE_FORMAT).to_string(), 1, TEXT),
        (String::new(), 1, TEXT),
        (format!("{:<10}{}", "Total", summary.total), 1, TEXT),
        (
            format!(
                "{:<10}{}",
                "Max",
                summary
                    .max_magnitude
                    .map_or_else(|| "-".to_string(), format_magnitude)
            ),
            1,
            TEXT,
        ),
    ];

    for &bucket in MagnitudeBucket::ALL {
        let label = format!("M{}", bucket.label());
        lines.push((
            format!("{label:<10}{}", summary.count(bucket)),
            1,
            palette::magnitude_color(bucket.lower_bound().max(1.0)),
        ));
    }

    lines.push((String::new(), 1, TEXT));
    lines.push((options.source_credit.clone(), 1, DIM_TEXT));
    lines.push((options.handle.clone(), 1, DIM_TEXT));
    lines
}

#[allow(clippy::cast_precision_loss)]
fn draw_summary(
    pixmap: &mut Pixmap,
    layout: &Layout,
    summary: &DailySummary,
    options: &RenderOptions,
) {
    let lines = summary_lines(summary, options);

    let block_height: f32 = lines
        .iter()
        .map(|(_, multiplier, _)| layout.line_height(layout.text_scale * multiplier))
        .sum();
    let block_width = lines
        .iter()
        .map(|(line, multiplier, _)| text::text_width(line, layout.text_scale * multiplier))
        .max()
        .unwrap_or(0) as f32;

    let padding = 16.0 * layout.scale;
    let x = layout.margin;
    let mut y = layout.height - layout.margin - block_height;

    if let Some(panel) = Rect::from_xywh(
        x - padding,
        y - padding,
        2.0f32.mul_add(padding, block_width),
        2.0f32.mul_add(padding, block_height),
    ) {
        pixmap.fill_rect(panel, &paint(BACKGROUND, 190), Transform::identity(), None);
    }

    for (line, multiplier, rgb) in &lines {
        let scale = layout.text_scale * multiplier;
        text::draw_text(pixmap, line, x, y, scale, *rgb);
        y += layout.line_height(scale);
    }
}

#[allow(clippy::cast_precision_loss)]
fn draw_no_activity(pixmap: &mut Pixmap, layout: &Layout) {
    let notice = "NO ACTIVITY RECORDED";
    let scale = layout.text_scale * 2;
    let text_width = text::text_width(notice, scale) as f32;
    let x = (layout.width - text_width) / 2.0;
    let y = (layout.height - (GLYPH_SIZE * scale) as f32) / 2.0;
    text::draw_text(pixmap, notice, x, y, scale, TEXT);
}
