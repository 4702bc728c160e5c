use crate::series::{Marker, Series};
use anyhow::{bail, Context, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;
use std::process::Command;

/// Where `plot` writes by default. The directory is expected to exist.
pub const DEFAULT_OUTPUT: &str = "docs/performance-plots/minheap_before_after.png";

pub const TITLE: &str = "MinHeap Benchmark: Before vs After Optimization";
pub const X_LABEL: &str = "Input Size (n)";
pub const Y_LABEL: &str = "Time (ns)";

pub const DEFAULT_DPI: u32 = 300;

const POINTS_PER_INCH: f64 = 72.0;
const INCHES_PER_METER: f64 = 1.0 / 0.0254;

// Sizes below are in typographic points and scaled by dpi / 72 when drawn.
const TITLE_FONT_PT: f64 = 12.0;
const AXIS_LABEL_FONT_PT: f64 = 10.0;
const TICK_LABEL_FONT_PT: f64 = 10.0;
const LEGEND_FONT_PT: f64 = 10.0;
const LINE_WIDTH_PT: f64 = 1.5;
const MARKER_RADIUS_PT: f64 = 3.0;
const GRID_WIDTH_PT: f64 = 0.5;
const GRID_DASH_PT: f64 = 1.85;
const GRID_GAP_PT: f64 = 0.8;
const MARGIN_PT: f64 = 10.0;
const X_LABEL_AREA_PT: f64 = 36.0;
const Y_LABEL_AREA_PT: f64 = 48.0;
const LEGEND_GLYPH_PT: f64 = 20.0;

/// Fraction of the log span added on each side of the data
const LOG_AXIS_MARGIN: f64 = 0.05;

const SERIES_COLORS: &[RGBColor] = &[
    RGBColor(31, 119, 180), // Blue (before)
    RGBColor(255, 127, 14), // Orange (after)
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

const GRID_COLOR: RGBColor = RGBColor(176, 176, 176);

/// Figure geometry and labels
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width_in: 6.4,
            height_in: 4.8,
            dpi: DEFAULT_DPI,
            title: TITLE.to_string(),
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
        }
    }
}

impl ChartConfig {
    /// Canvas size in pixels (inches × dpi)
    pub fn pixel_size(&self) -> Result<(u32, u32)> {
        if self.dpi == 0 {
            bail!("DPI must be positive");
        }
        if !(self.width_in > 0.0 && self.height_in > 0.0) {
            bail!(
                "Figure size must be positive, got {}x{} inches",
                self.width_in,
                self.height_in
            );
        }
        let dpi = self.dpi as f64;
        Ok((
            (self.width_in * dpi).round() as u32,
            (self.height_in * dpi).round() as u32,
        ))
    }

    fn px(&self, points: f64) -> f64 {
        points * self.dpi as f64 / POINTS_PER_INCH
    }

    /// Points to whole pixels, never below one
    fn px_u32(&self, points: f64) -> u32 {
        self.px(points).round().max(1.0) as u32
    }
}

/// An RGB8 raster produced by [`render`]
#[derive(Debug, Clone)]
pub struct RenderedChart {
    width: u32,
    height: u32,
    dpi: u32,
    pixels: Vec<u8>,
}

impl RenderedChart {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Encode as PNG, recording the DPI in the `pHYs` chunk
    pub fn write_png<W: Write>(&self, out: W) -> Result<()> {
        let ppm = dpi_to_pixels_per_meter(self.dpi);
        let mut encoder = png::Encoder::new(out, self.width, self.height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_pixel_dims(Some(png::PixelDimensions {
            xppu: ppm,
            yppu: ppm,
            unit: png::Unit::Meter,
        }));
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        writer.finish()?;
        Ok(())
    }

    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_png(&mut bytes)?;
        Ok(bytes)
    }

    /// Write the PNG to `path`. Parent directories are not created.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create chart file {}", path.display()))?;
        let mut out = BufWriter::new(file);
        self.write_png(&mut out)
            .with_context(|| format!("Failed to encode PNG to {}", path.display()))?;
        out.flush()?;
        Ok(())
    }
}

pub fn dpi_to_pixels_per_meter(dpi: u32) -> u32 {
    (dpi as f64 * INCHES_PER_METER).round() as u32
}

/// Axis range covering every positive value with a margin in log space.
/// Non-positive values cannot sit on a log axis and are ignored.
pub fn log_range(values: impl IntoIterator<Item = f64>) -> Result<Range<f64>> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| *v > 0.0 && v.is_finite())
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        bail!("No positive values to place on a log axis");
    }

    let (log_lo, log_hi) = (lo.log10(), hi.log10());
    let span = log_hi - log_lo;
    let pad = if span > 0.0 {
        span * LOG_AXIS_MARGIN
    } else {
        0.5
    };
    Ok(10f64.powf(log_lo - pad)..10f64.powf(log_hi + pad))
}

/// Major (10^k) and minor (m × 10^k, m = 2..9) grid positions inside `range`
pub fn log_grid_lines(range: &Range<f64>) -> Vec<f64> {
    if !(range.start > 0.0 && range.end > range.start) {
        return Vec::new();
    }
    let first = range.start.log10().floor() as i32;
    let last = range.end.log10().ceil() as i32;

    let mut lines = Vec::new();
    for exp in first..=last {
        let decade = 10f64.powi(exp);
        for m in 1..=9 {
            let value = decade * m as f64;
            if value >= range.start && value <= range.end {
                lines.push(value);
            }
        }
    }
    lines
}

/// Split a log axis into dash segments of fixed on-screen length.
///
/// `axis_px` is the rendered length of the axis; dash and gap lengths are in
/// the same pixels. Returned pairs are in data coordinates.
pub fn dash_segments(
    range: &Range<f64>,
    axis_px: f64,
    dash_px: f64,
    gap_px: f64,
) -> Vec<(f64, f64)> {
    if !(range.start > 0.0 && range.end > range.start) || axis_px <= 0.0 || dash_px <= 0.0 {
        return Vec::new();
    }
    let (log_lo, log_hi) = (range.start.log10(), range.end.log10());
    let per_px = (log_hi - log_lo) / axis_px;
    let dash = dash_px * per_px;
    let cycle = (dash_px + gap_px.max(0.0)) * per_px;

    // Index-based starts avoid drift from repeated addition
    (0..)
        .map(|i| log_lo + i as f64 * cycle)
        .take_while(|&start| start < log_hi)
        .map(|start| {
            let end = (start + dash).min(log_hi);
            (10f64.powf(start), 10f64.powf(end))
        })
        .collect()
}

/// Tick text for log axes: only exact powers of ten get a label
pub fn format_log_tick(value: f64) -> String {
    if value <= 0.0 {
        return String::new();
    }
    let log10 = value.log10();
    let nearest = log10.round();
    if (log10 - nearest).abs() < 1e-6 {
        format!("10{}", superscript(nearest as i32))
    } else {
        String::new()
    }
}

fn superscript(n: i32) -> String {
    const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    let mut out = String::new();
    if n < 0 {
        out.push('⁻');
    }
    for c in n.unsigned_abs().to_string().chars() {
        if let Some(d) = c.to_digit(10) {
            out.push(DIGITS[d as usize]);
        }
    }
    out
}

/// Outline of a marker centred on `(cx, cy)` in backend pixels
pub fn marker_outline(marker: Marker, (cx, cy): (i32, i32), radius: i32) -> Vec<(i32, i32)> {
    match marker {
        Marker::Square => vec![
            (cx - radius, cy - radius),
            (cx + radius, cy - radius),
            (cx + radius, cy + radius),
            (cx - radius, cy + radius),
        ],
        Marker::Circle => {
            const SIDES: usize = 24;
            (0..SIDES)
                .map(|i| {
                    let theta = i as f64 / SIDES as f64 * std::f64::consts::TAU;
                    (
                        cx + (radius as f64 * theta.cos()).round() as i32,
                        cy + (radius as f64 * theta.sin()).round() as i32,
                    )
                })
                .collect()
        }
    }
}

/// Draw the series onto an in-memory raster
pub fn render(series: &[Series], config: &ChartConfig) -> Result<RenderedChart> {
    let (width, height) = config.pixel_size()?;
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        draw(&root, series, config)?;
        root.present()?;
    }
    Ok(RenderedChart {
        width,
        height,
        dpi: config.dpi,
        pixels,
    })
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &[Series],
    config: &ChartConfig,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    if series.iter().all(|s| s.is_empty()) {
        bail!("Nothing to plot: every series is empty");
    }

    root.fill(&WHITE)?;

    let x_range = log_range(
        series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.input_size as f64)),
    )?;
    let y_range = log_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.time_ns)))?;

    let mut chart = ChartBuilder::on(root)
        .caption(
            config.title.as_str(),
            ("sans-serif", config.px_u32(TITLE_FONT_PT)),
        )
        .margin(config.px_u32(MARGIN_PT))
        .x_label_area_size(config.px_u32(X_LABEL_AREA_PT))
        .y_label_area_size(config.px_u32(Y_LABEL_AREA_PT))
        .build_cartesian_2d(
            x_range.clone().log_scale(),
            y_range.clone().log_scale(),
        )?;

    // The built-in mesh is solid; the dashed grid is drawn below.
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(12)
        .y_labels(12)
        .x_label_formatter(&|x| format_log_tick(*x))
        .y_label_formatter(&|y| format_log_tick(*y))
        .x_desc(config.x_label.as_str())
        .y_desc(config.y_label.as_str())
        .label_style(("sans-serif", config.px_u32(TICK_LABEL_FONT_PT)))
        .axis_desc_style(("sans-serif", config.px_u32(AXIS_LABEL_FONT_PT)))
        .draw()?;

    let (plot_w, plot_h) = chart.plotting_area().dim_in_pixel();
    let grid_style = GRID_COLOR.stroke_width(config.px_u32(GRID_WIDTH_PT));
    let (dash_px, gap_px) = (config.px(GRID_DASH_PT), config.px(GRID_GAP_PT));

    let vertical = dash_segments(&y_range, plot_h as f64, dash_px, gap_px);
    for x in log_grid_lines(&x_range) {
        chart.draw_series(
            vertical
                .iter()
                .map(|&(y0, y1)| PathElement::new(vec![(x, y0), (x, y1)], grid_style)),
        )?;
    }
    let horizontal = dash_segments(&x_range, plot_w as f64, dash_px, gap_px);
    for y in log_grid_lines(&y_range) {
        chart.draw_series(
            horizontal
                .iter()
                .map(|&(x0, x1)| PathElement::new(vec![(x0, y), (x1, y)], grid_style)),
        )?;
    }

    let radius = config.px_u32(MARKER_RADIUS_PT) as i32;
    let glyph_len = config.px_u32(LEGEND_GLYPH_PT) as i32;

    for (idx, s) in series.iter().enumerate() {
        let color = SERIES_COLORS[idx % SERIES_COLORS.len()];
        let line_style = color.stroke_width(config.px_u32(LINE_WIDTH_PT));
        let fill = color.filled();
        let coords = s.coords();

        let outline = marker_outline(s.marker, (0, 0), radius);
        let legend_outline = marker_outline(s.marker, (glyph_len / 2, 0), radius);

        chart
            .draw_series(LineSeries::new(coords.clone(), line_style))?
            .label(s.label.as_str())
            .legend(move |(x, y)| {
                EmptyElement::at((x, y))
                    + PathElement::new(vec![(0, 0), (glyph_len, 0)], line_style)
                    + Polygon::new(legend_outline.clone(), fill)
            });

        chart.draw_series(
            coords
                .into_iter()
                .map(|coord| EmptyElement::at(coord) + Polygon::new(outline.clone(), fill)),
        )?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .margin(config.px_u32(MARGIN_PT))
        .legend_area_size(glyph_len + config.px_u32(MARGIN_PT) as i32)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", config.px_u32(LEGEND_FONT_PT)))
        .draw()?;

    Ok(())
}

/// Render `series` and write the PNG to `output`
pub fn generate_chart(
    series: &[Series],
    config: &ChartConfig,
    output: &Path,
) -> Result<RenderedChart> {
    let rendered = render(series, config)?;
    rendered.save(output)?;
    println!(
        "Generated: {} ({}x{} px, {} dpi)",
        output.display(),
        rendered.width(),
        rendered.height(),
        rendered.dpi()
    );
    Ok(rendered)
}

fn viewer_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Open `path` in the platform image viewer
pub fn show(path: &Path) -> Result<()> {
    let status = viewer_command(path)
        .status()
        .context("Failed to launch an image viewer")?;
    if !status.success() {
        bail!("Image viewer exited with {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::load_data;
    use tempfile::TempDir;

    fn blank_chart(width: u32, height: u32, dpi: u32) -> RenderedChart {
        RenderedChart {
            width,
            height,
            dpi,
            pixels: vec![255; (width * height * 3) as usize],
        }
    }

    #[test]
    fn test_default_canvas_size() {
        let config = ChartConfig::default();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.pixel_size().unwrap(), (1920, 1440));

        let low = ChartConfig {
            dpi: 100,
            ..ChartConfig::default()
        };
        assert_eq!(low.pixel_size().unwrap(), (640, 480));
    }

    #[test]
    fn test_invalid_config() {
        let zero_dpi = ChartConfig {
            dpi: 0,
            ..ChartConfig::default()
        };
        assert!(zero_dpi.pixel_size().is_err());

        let flat = ChartConfig {
            height_in: 0.0,
            ..ChartConfig::default()
        };
        assert!(flat.pixel_size().is_err());
    }

    #[test]
    fn test_point_scaling() {
        let config = ChartConfig::default();
        assert_eq!(config.px_u32(72.0), 300);
        assert_eq!(config.px_u32(GRID_WIDTH_PT), 2);
        let tiny = ChartConfig {
            dpi: 10,
            ..ChartConfig::default()
        };
        assert_eq!(tiny.px_u32(GRID_WIDTH_PT), 1);
    }

    #[test]
    fn test_dpi_to_ppm() {
        assert_eq!(dpi_to_pixels_per_meter(300), 11811);
        assert_eq!(dpi_to_pixels_per_meter(72), 2835);
    }

    #[test]
    fn test_log_range_pads_in_log_space() {
        let range = log_range([100.0, 100_000.0]).unwrap();
        // 3 decades, 5% each side
        assert!((range.start.log10() - 1.85).abs() < 1e-9);
        assert!((range.end.log10() - 5.15).abs() < 1e-9);
    }

    #[test]
    fn test_log_range_edge_cases() {
        assert!(log_range(std::iter::empty()).is_err());
        assert!(log_range([0.0, -5.0]).is_err());

        let single = log_range([1000.0]).unwrap();
        assert!((single.start.log10() - 2.5).abs() < 1e-9);
        assert!((single.end.log10() - 3.5).abs() < 1e-9);

        let mixed = log_range([0.0, 10.0, 1000.0]).unwrap();
        assert!(mixed.start > 0.0);
    }

    #[test]
    fn test_log_grid_lines() {
        let lines = log_grid_lines(&(50.0..2500.0));
        assert_eq!(lines.first().copied(), Some(50.0));
        assert_eq!(lines.last().copied(), Some(2000.0));
        // majors and minors are both present
        assert!(lines.contains(&100.0));
        assert!(lines.contains(&1000.0));
        assert!(lines.contains(&300.0));
        assert!(lines.windows(2).all(|w| w[0] < w[1]));

        assert!(log_grid_lines(&(0.0..10.0)).is_empty());
        assert!(log_grid_lines(&(10.0..1.0)).is_empty());
    }

    #[test]
    fn test_dash_segments() {
        let segments = dash_segments(&(1.0..10.0), 100.0, 6.0, 4.0);
        assert_eq!(segments.len(), 10);
        let (s0, e0) = segments[0];
        assert!((s0 - 1.0).abs() < 1e-12);
        assert!((e0.log10() - 0.06).abs() < 1e-9);
        assert!(segments.iter().all(|(s, e)| s < e));
        assert!(segments.last().unwrap().1 <= 10.0 + 1e-9);

        assert!(dash_segments(&(1.0..10.0), 0.0, 6.0, 4.0).is_empty());
    }

    #[test]
    fn test_format_log_tick() {
        assert_eq!(format_log_tick(100.0), "10²");
        assert_eq!(format_log_tick(1e7), "10⁷");
        assert_eq!(format_log_tick(1.0), "10⁰");
        assert_eq!(format_log_tick(0.01), "10⁻²");
        assert_eq!(format_log_tick(200.0), "");
        assert_eq!(format_log_tick(0.0), "");
    }

    #[test]
    fn test_marker_outline() {
        let square = marker_outline(Marker::Square, (10, 10), 3);
        assert_eq!(square, vec![(7, 7), (13, 7), (13, 13), (7, 13)]);

        let circle = marker_outline(Marker::Circle, (0, 0), 10);
        assert_eq!(circle.len(), 24);
        assert_eq!(circle[0], (10, 0));
        assert!(circle
            .iter()
            .all(|&(x, y)| ((x * x + y * y) as f64).sqrt() <= 11.0));
    }

    #[test]
    fn test_png_carries_dpi() {
        let chart = blank_chart(8, 4, 300);
        let bytes = chart.to_png_bytes().unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let decoder = png::Decoder::new(bytes.as_slice());
        let reader = decoder.read_info().unwrap();
        let info = reader.info();
        assert_eq!((info.width, info.height), (8, 4));
        let dims = info.pixel_dims.unwrap();
        assert_eq!(dims.xppu, 11811);
        assert_eq!(dims.yppu, 11811);
        assert_eq!(dims.unit, png::Unit::Meter);
    }

    #[test]
    fn test_save_requires_existing_directory() {
        let dir = TempDir::new().unwrap();
        let chart = blank_chart(2, 2, 300);

        let missing = dir.path().join("docs/performance-plots/out.png");
        let err = chart.save(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to create chart file"));
        assert!(!missing.exists());

        let ok = dir.path().join("out.png");
        chart.save(&ok).unwrap();
        assert!(std::fs::metadata(&ok).unwrap().len() > 0);
    }

    #[test]
    fn test_render_rejects_empty_series() {
        let empty = [Series::new("empty", Marker::Circle, Vec::new())];
        assert!(render(&empty, &ChartConfig::default()).is_err());
    }

    #[test]
    #[ignore = "needs system fonts for text rendering"]
    fn test_generate_chart_writes_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("minheap_before_after.png");
        let config = ChartConfig {
            dpi: 100,
            ..ChartConfig::default()
        };

        let rendered = generate_chart(&load_data(), &config, &path).unwrap();
        assert_eq!((rendered.width(), rendered.height()), (640, 480));
        // not a blank canvas
        assert!(rendered.pixels().iter().any(|&b| b != 255));

        let file = File::open(&path).unwrap();
        let reader = png::Decoder::new(file).read_info().unwrap();
        assert_eq!(reader.info().width, 640);
    }

    #[test]
    #[ignore = "needs system fonts for text rendering"]
    fn test_render_is_deterministic() {
        let config = ChartConfig {
            dpi: 100,
            ..ChartConfig::default()
        };
        let first = render(&load_data(), &config).unwrap();
        let second = render(&load_data(), &config).unwrap();
        assert_eq!(first.pixels(), second.pixels());
        assert_eq!(first.to_png_bytes().unwrap(), second.to_png_bytes().unwrap());
    }
}
