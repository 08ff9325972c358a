//! In-memory raster implementation of [`DrawingSurface`].
//!
//! The canvas is split into a title band, a PlateCarree plot area and a
//! vertical colorbar on the right (3% of the width, 4% padding). Drawing goes
//! to a back buffer; `present` copies it to the front buffer that clients
//! read, so a half-drawn frame is never served.

use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use forecast_common::BoundingBox;

use crate::colorbands::{Color, ColorBandTable};
use crate::error::RenderError;
use crate::mesh::{nearest_indices, ColoredMesh};
use crate::png::encode_png;
use crate::surface::{
    colors, BasemapRenderer, DrawingSurface, FeatureKind, FeatureLayer, GridlineStyle, LineStyle,
    Projection,
};
use crate::text::{Align, TextRenderer};

const TITLE_BAND: u32 = 70;
const MARGIN_LEFT: u32 = 60;
const MARGIN_BOTTOM: u32 = 40;
const MARGIN_RIGHT: u32 = 60;
const COLORBAR_FRACTION: f64 = 0.03;
const COLORBAR_PAD: f64 = 0.04;
const TITLE_SIZE: f32 = 20.0;
const TICK_LABEL_SIZE: f32 = 12.0;

/// Pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Plot and colorbar rectangles for a canvas size and map extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLayout {
    pub plot: PixelRect,
    pub colorbar: PixelRect,
}

impl PlotLayout {
    /// Largest plot with the extent's aspect ratio that leaves room for
    /// margins and the colorbar.
    pub fn compute(width: u32, height: u32, extent: &BoundingBox) -> Self {
        let bar_width = ((f64::from(width) * COLORBAR_FRACTION).round() as u32).max(4);
        let pad = (f64::from(width) * COLORBAR_PAD).round() as u32;

        let avail_w = width
            .saturating_sub(MARGIN_LEFT + pad + bar_width + MARGIN_RIGHT)
            .max(1);
        let avail_h = height.saturating_sub(TITLE_BAND + MARGIN_BOTTOM).max(1);

        let aspect = if extent.height() > 0.0 {
            extent.width() / extent.height()
        } else {
            1.0
        };
        let (plot_w, plot_h) = if f64::from(avail_w) / f64::from(avail_h) > aspect {
            (((f64::from(avail_h) * aspect).round() as u32).max(1), avail_h)
        } else {
            (avail_w, ((f64::from(avail_w) / aspect).round() as u32).max(1))
        };

        let plot = PixelRect {
            x: MARGIN_LEFT,
            y: TITLE_BAND,
            width: plot_w,
            height: plot_h,
        };
        let colorbar = PixelRect {
            x: plot.right() + pad,
            y: plot.y,
            width: bar_width,
            height: plot_h,
        };
        Self { plot, colorbar }
    }
}

/// Colorbar handle for [`RasterSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct RasterColorBar {
    pub label: String,
    pub bounds: Vec<f64>,
    pub colors: Vec<Color>,
    /// Number of times the bar has been drawn
    pub draws: u32,
}

impl RasterColorBar {
    fn bind(&mut self, table: &ColorBandTable) {
        self.bounds = table.bounds();
        self.colors = table.colors();
    }
}

/// RGBA canvas with a presented front buffer.
pub struct RasterSurface {
    canvas: RgbaImage,
    front: RgbaImage,
    extent: BoundingBox,
    layout: PlotLayout,
    text: Option<TextRenderer>,
    title: Option<String>,
    presented: u64,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let extent = crate::frame::default_extent();
        let blank = RgbaImage::from_pixel(width, height, Rgba(colors::WHITE.to_rgba(255)));
        Self {
            canvas: blank.clone(),
            front: blank,
            layout: PlotLayout::compute(width, height, &extent),
            extent,
            text: None,
            title: None,
            presented: 0,
        }
    }

    /// Enable text (title, tick labels) with the given font.
    pub fn with_text(mut self, text: TextRenderer) -> Self {
        self.text = Some(text);
        self
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn layout(&self) -> &PlotLayout {
        &self.layout
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Number of frames presented so far.
    pub fn presented_count(&self) -> u64 {
        self.presented
    }

    /// The last presented frame.
    pub fn front(&self) -> &RgbaImage {
        &self.front
    }

    /// PNG of the last presented frame.
    pub fn frame_png(&self) -> Result<Vec<u8>, RenderError> {
        encode_png(&self.front)
    }

    /// Pixel position of a lon/lat inside the plot area.
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let plot = &self.layout.plot;
        let x = f64::from(plot.x)
            + (lon - self.extent.min_lon) / self.extent.width() * f64::from(plot.width);
        let y = f64::from(plot.y)
            + (self.extent.max_lat - lat) / self.extent.height() * f64::from(plot.height);
        (x, y)
    }

    /// Fill the plot area with a solid color.
    pub fn fill_plot(&mut self, color: Color) {
        let plot = self.layout.plot;
        self.fill_rect(plot, color);
    }

    /// One-pixel border around the plot area.
    pub fn stroke_plot_border(&mut self, color: Color) {
        let plot = self.layout.plot;
        self.stroke_rect(plot, color);
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Color) {
        let px = Rgba(color.to_rgba(255));
        let x_end = rect.right().min(self.canvas.width());
        let y_end = rect.bottom().min(self.canvas.height());
        for y in rect.y..y_end {
            for x in rect.x..x_end {
                self.canvas.put_pixel(x, y, px);
            }
        }
    }

    fn stroke_rect(&mut self, rect: PixelRect, color: Color) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let right = rect.right() - 1;
        let bottom = rect.bottom() - 1;
        for x in rect.x..=right {
            self.blend(x, rect.y, color, 1.0);
            self.blend(x, bottom, color, 1.0);
        }
        for y in rect.y..=bottom {
            self.blend(rect.x, y, color, 1.0);
            self.blend(right, y, color, 1.0);
        }
    }

    fn blend(&mut self, x: u32, y: u32, color: Color, alpha: f32) {
        if x >= self.canvas.width() || y >= self.canvas.height() {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let dst = self.canvas.get_pixel_mut(x, y);
        let mix = |src: u8, dst: u8| (f32::from(src) * alpha + f32::from(dst) * (1.0 - alpha)).round() as u8;
        *dst = Rgba([
            mix(color.r, dst[0]),
            mix(color.g, dst[1]),
            mix(color.b, dst[2]),
            255,
        ]);
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, size: f32, align: Align) {
        if let Some(renderer) = &self.text {
            renderer.draw(&mut self.canvas, text, x, y, size, Rgba(colors::BLACK.to_rgba(255)), align);
        }
    }

    fn draw_colorbar(&mut self, colorbar: &mut RasterColorBar) {
        let rect = self.layout.colorbar;
        let n = colorbar.colors.len();
        if n == 0 || rect.height == 0 {
            return;
        }

        // Lowest band at the bottom.
        for (i, color) in colorbar.colors.iter().enumerate() {
            let top = rect.y + (rect.height as usize * (n - 1 - i) / n) as u32;
            let bottom = rect.y + (rect.height as usize * (n - i) / n) as u32;
            self.fill_rect(
                PixelRect {
                    x: rect.x,
                    y: top,
                    width: rect.width,
                    height: bottom - top,
                },
                *color,
            );
        }
        self.stroke_rect(rect, colors::BLACK);

        let step = n.div_ceil(10).max(1);
        let label_x = (rect.right() + 4) as i32;
        for (i, bound) in colorbar.bounds.iter().enumerate().step_by(step) {
            let y = rect.y + (rect.height as usize * (n - i) / n) as u32;
            for x in rect.right()..rect.right() + 3 {
                self.blend(x, y.min(rect.bottom() - 1), colors::BLACK, 1.0);
            }
            let text = format!("{}", bound);
            self.draw_text(&text, label_x, y as i32 - 6, TICK_LABEL_SIZE, Align::Left);
        }
        let label = colorbar.label.clone();
        self.draw_text(
            &label,
            (rect.x + rect.width / 2) as i32,
            rect.y as i32 - 18,
            TICK_LABEL_SIZE,
            Align::Center,
        );
        colorbar.draws += 1;
    }

    fn draw_line(&mut self, horizontal: bool, at: u32, style: &GridlineStyle) {
        let plot = self.layout.plot;
        let (start, end) = if horizontal {
            (plot.x, plot.right())
        } else {
            (plot.y, plot.bottom())
        };
        let (on, period) = match style.line_style {
            LineStyle::Solid => (1, 1),
            LineStyle::Dashed => (6, 10),
            LineStyle::Dotted => (1, 3),
        };
        for t in start..end {
            if (t - start) % period >= on {
                continue;
            }
            let (x, y) = if horizontal { (t, at) } else { (at, t) };
            self.blend(x, y, style.color, style.alpha);
        }
    }
}

/// `10°E`, `20°W`, `0°`, `180°`.
pub fn format_lon_label(lon: f64) -> String {
    let lon = forecast_common::bbox::normalize_longitude(lon);
    if lon == 0.0 || lon == -180.0 {
        format!("{}°", lon.abs())
    } else if lon > 0.0 {
        format!("{}°E", lon)
    } else {
        format!("{}°W", -lon)
    }
}

/// `40°N`, `10°S`, `0°`.
pub fn format_lat_label(lat: f64) -> String {
    if lat == 0.0 {
        "0°".to_string()
    } else if lat > 0.0 {
        format!("{}°N", lat)
    } else {
        format!("{}°S", -lat)
    }
}

/// Multiples of `spacing` within `[min, max]`.
pub fn gridline_positions(min: f64, max: f64, spacing: f64) -> Vec<f64> {
    if spacing <= 0.0 || min > max {
        return Vec::new();
    }
    let first = (min / spacing).ceil() as i64;
    let last = (max / spacing).floor() as i64;
    (first..=last).map(|k| k as f64 * spacing).collect()
}

impl DrawingSurface for RasterSurface {
    type ColorBar = RasterColorBar;

    fn clear(&mut self) {
        let white = Rgba(colors::WHITE.to_rgba(255));
        for px in self.canvas.pixels_mut() {
            *px = white;
        }
        self.title = None;
    }

    fn set_extent(&mut self, extent: &BoundingBox, projection: Projection) {
        let Projection::PlateCarree = projection;
        self.extent = *extent;
        self.layout = PlotLayout::compute(self.canvas.width(), self.canvas.height(), extent);
    }

    fn draw_mesh(&mut self, mesh: &ColoredMesh) {
        let plot = self.layout.plot;
        let pixel_lons: Vec<f64> = (0..plot.width)
            .map(|px| {
                self.extent.min_lon
                    + (f64::from(px) + 0.5) / f64::from(plot.width) * self.extent.width()
            })
            .collect();
        let pixel_lats: Vec<f64> = (0..plot.height)
            .map(|py| {
                self.extent.max_lat
                    - (f64::from(py) + 0.5) / f64::from(plot.height) * self.extent.height()
            })
            .collect();

        let columns = nearest_indices(&mesh.lons, &pixel_lons, true);
        let rows = nearest_indices(&mesh.lats, &pixel_lats, false);

        let mut painted = 0usize;
        for (py, row) in rows.iter().enumerate() {
            let Some(j) = row else { continue };
            for (px, column) in columns.iter().enumerate() {
                let Some(i) = column else { continue };
                if let Some(color) = mesh.cell(*i, *j) {
                    self.canvas.put_pixel(
                        plot.x + px as u32,
                        plot.y + py as u32,
                        Rgba(color.to_rgba(255)),
                    );
                    painted += 1;
                }
            }
        }
        debug!(painted, "Painted mesh");
    }

    fn create_colorbar(&mut self, table: &ColorBandTable, label: &str) -> RasterColorBar {
        let mut colorbar = RasterColorBar {
            label: label.to_string(),
            bounds: Vec::new(),
            colors: Vec::new(),
            draws: 0,
        };
        colorbar.bind(table);
        self.draw_colorbar(&mut colorbar);
        colorbar
    }

    fn refresh_colorbar(&mut self, colorbar: &mut RasterColorBar, table: &ColorBandTable) {
        colorbar.bind(table);
        self.draw_colorbar(colorbar);
    }

    fn draw_gridlines(&mut self, style: &GridlineStyle) {
        let plot = self.layout.plot;
        let extent = self.extent;

        for lon in gridline_positions(extent.min_lon, extent.max_lon, style.spacing) {
            let (x, _) = self.project(lon, extent.max_lat);
            let x = (x.round() as u32).min(plot.right().saturating_sub(1));
            self.draw_line(false, x, style);
            if style.labels_bottom {
                self.draw_text(&format_lon_label(lon), x as i32, (plot.bottom() + 6) as i32, style.label_size, Align::Center);
            }
            if style.labels_top {
                self.draw_text(&format_lon_label(lon), x as i32, plot.y as i32 - 16, style.label_size, Align::Center);
            }
        }

        for lat in gridline_positions(extent.min_lat, extent.max_lat, style.spacing) {
            let (_, y) = self.project(extent.min_lon, lat);
            let y = (y.round() as u32).min(plot.bottom().saturating_sub(1));
            self.draw_line(true, y, style);
            if style.labels_left {
                self.draw_text(&format_lat_label(lat), plot.x as i32 - 6, y as i32 - 6, style.label_size, Align::Right);
            }
            if style.labels_right {
                self.draw_text(&format_lat_label(lat), plot.right() as i32 + 6, y as i32 - 6, style.label_size, Align::Left);
            }
        }
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
        let center = (self.canvas.width() / 2) as i32;
        if let Some(renderer) = &self.text {
            renderer.draw_lines(
                &mut self.canvas,
                title,
                center,
                12,
                TITLE_SIZE,
                Rgba(colors::BLACK.to_rgba(255)),
                Align::Center,
            );
        } else if self.presented == 0 {
            warn!("No font configured, title and labels are not drawn");
        }
    }

    fn present(&mut self) {
        self.front.copy_from_slice(&self.canvas);
        self.presented += 1;
    }
}

/// Basemap without vector geometry: paints the ocean fill across the
/// extent and frames the plot with the coastline stroke.
///
/// Land, lakes, rivers and borders need feature geometry and are left to a
/// richer [`BasemapRenderer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatBasemap;

impl BasemapRenderer<RasterSurface> for FlatBasemap {
    fn draw(
        &self,
        surface: &mut RasterSurface,
        _extent: &BoundingBox,
        _projection: Projection,
        layers: &[FeatureLayer],
    ) {
        let background = layers
            .iter()
            .find(|l| l.kind == FeatureKind::Ocean)
            .and_then(|l| l.style.fill)
            .unwrap_or(colors::WHITE);
        surface.fill_plot(background);

        let border = layers
            .iter()
            .find(|l| l.kind == FeatureKind::Coastline)
            .map(|l| l.style.line_color)
            .unwrap_or(colors::BLACK);
        surface.stroke_plot_border(border);
    }
}
