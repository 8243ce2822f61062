use geo::{Area, BoundingRect, Geometry, MultiPolygon, Polygon};
use ratatui::layout::Rect as TuiRect;
use ratatui::style::Color;
use ratatui::widgets::canvas::{Canvas, Context, Line};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;
use std::collections::HashMap;

use covid_atlas::geometry::GeometryTable;
use covid_atlas::snapshot::GeoSnapshot;

/// Plasma, 11 steps, darkest for the highest counts.
const PALETTE: [Color; 11] = [
    Color::Rgb(0xEF, 0xF8, 0x21),
    Color::Rgb(0xFC, 0xCC, 0x25),
    Color::Rgb(0xFC, 0xA6, 0x35),
    Color::Rgb(0xF1, 0x82, 0x4C),
    Color::Rgb(0xE0, 0x64, 0x61),
    Color::Rgb(0xCA, 0x46, 0x78),
    Color::Rgb(0xB0, 0x2A, 0x8F),
    Color::Rgb(0x8F, 0x0D, 0xA3),
    Color::Rgb(0x6A, 0x00, 0xA7),
    Color::Rgb(0x40, 0x03, 0x9C),
    Color::Rgb(0x0C, 0x07, 0x86),
];

/// Color for countries without a value.
pub const NAN_COLOR: Color = Color::Rgb(0xD9, 0xD9, 0xD9);
const HIGHLIGHT_COLOR: Color = Color::Cyan;

/// Linear mapping of counts onto [`PALETTE`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScale {
    pub low: f64,
    pub high: f64,
}

impl ColorScale {
    pub fn new(range: Option<(f64, f64)>) -> Self {
        let (low, high) = range.unwrap_or((0.0, 1.0));
        Self { low, high }
    }

    pub fn palette() -> &'static [Color] {
        &PALETTE
    }

    pub fn color(&self, value: Option<f64>) -> Color {
        let Some(v) = value else {
            return NAN_COLOR;
        };
        let span = self.high - self.low;
        let t = if span > 0.0 { ((v - self.low) / span).clamp(0.0, 1.0) } else { 0.0 };
        let idx = (t * (PALETTE.len() - 1) as f64).round() as usize;
        PALETTE[idx.min(PALETTE.len() - 1)]
    }
}

struct MapItem {
    country: String,
    shape: MultiPolygon<f64>,
}

/// Country outlines projected once; colors come from each snapshot.
pub struct MapView {
    items: Vec<MapItem>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl MapView {
    pub fn new(geometry: &GeometryTable) -> Self {
        let mut items = Vec::new();

        for row in geometry.rows() {
            let geom: Geometry<f64> = match row.geometry.value.clone().try_into() {
                Ok(g) => g,
                Err(e) => {
                    tracing::debug!(country = %row.country, error = %e, "Unusable geometry");
                    continue;
                }
            };
            let mut mp = match geom {
                Geometry::Polygon(p) => MultiPolygon(vec![p]),
                Geometry::MultiPolygon(m) => m,
                _ => continue,
            };

            // Drop small fragments so the braille canvas stays legible.
            if mp.0.len() > 1 {
                let max_area = mp.0.iter().map(|p| p.unsigned_area()).fold(0.0, f64::max);
                let threshold = max_area * 0.20;
                let filtered: Vec<Polygon<f64>> =
                    mp.0.iter().filter(|p| p.unsigned_area() >= threshold).cloned().collect();
                if !filtered.is_empty() {
                    mp = MultiPolygon(filtered);
                }
            }

            items.push(MapItem {
                country: row.country.clone(),
                shape: mp,
            });
        }

        let (mut minx, mut miny, mut maxx, mut maxy) =
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for rect in items.iter().filter_map(|item| item.shape.bounding_rect()) {
            minx = minx.min(rect.min().x);
            miny = miny.min(rect.min().y);
            maxx = maxx.max(rect.max().x);
            maxy = maxy.max(rect.max().y);
        }
        if !minx.is_finite() {
            (minx, miny, maxx, maxy) = (-180.0, -90.0, 180.0, 90.0);
        }

        Self { items, x_bounds: [minx, maxx], y_bounds: [miny, maxy] }
    }

    pub fn feature_count(&self) -> usize {
        self.items.len()
    }

    /// Draws every outline in its value color, then the selected country on top.
    pub fn render(
        &self,
        f: &mut Frame,
        area: TuiRect,
        title: &str,
        snapshot: &GeoSnapshot,
        scale: &ColorScale,
        highlight: Option<&str>,
    ) {
        let values: HashMap<&str, Option<f64>> = snapshot
            .features
            .iter()
            .map(|feature| (feature.country.as_str(), feature.value))
            .collect();

        let canvas = Canvas::default()
            .block(Block::default().title(title.to_string()).borders(Borders::ALL))
            .x_bounds(self.x_bounds)
            .y_bounds(self.y_bounds)
            .paint(|ctx| {
                for item in &self.items {
                    let color = scale.color(values.get(item.country.as_str()).copied().flatten());
                    draw_outline(ctx, &item.shape, color);
                }

                if let Some(sel) = highlight {
                    for item in self.items.iter().filter(|item| item.country == sel) {
                        draw_outline(ctx, &item.shape, HIGHLIGHT_COLOR);
                    }
                }
            });
        f.render_widget(canvas, area);
    }
}

fn draw_outline(ctx: &mut Context<'_>, shape: &MultiPolygon<f64>, color: Color) {
    for poly in &shape.0 {
        for window in poly.exterior().0.windows(2) {
            let (a, b) = (window[0], window[1]);
            ctx.draw(&Line { x1: a.x, y1: a.y, x2: b.x, y2: b.y, color });
        }
    }
}
