use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use ratatui::layout::Rect as TuiRect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::canvas::{Canvas, Rectangle};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use covid_atlas::dates::DISPLAY_FORMAT;
use covid_atlas::merge::CountrySeries;
use covid_atlas::series::SeriesKind;
use covid_atlas::snapshot::NO_DATA;

pub const BAR_PLOT_TITLE: &str = "Confirmed cases and number of deaths";

/// Drawn back to front: deaths sit on top of recovered, recovered on top of cases.
const DRAW_ORDER: [SeriesKind; 3] = [SeriesKind::Cases, SeriesKind::Recovered, SeriesKind::Deaths];

pub fn series_color(kind: SeriesKind) -> Color {
    match kind {
        SeriesKind::Cases => Color::Rgb(0x34, 0x05, 0x85),
        SeriesKind::Deaths => Color::Rgb(0xCF, 0x50, 0x2D),
        SeriesKind::Recovered => Color::Rgb(0x56, 0x85, 0x05),
    }
}

/// Days since `origin` as a canvas x coordinate.
fn x_of(origin: NaiveDateTime, at: NaiveDateTime) -> f64 {
    (at - origin).num_seconds() as f64 / 86_400.0
}

/// Per-country bars, one rectangle per day spanning `left..right`.
pub fn render(f: &mut Frame, area: TuiRect, series: &CountrySeries, selected: NaiveDate) {
    let title = format!("{BAR_PLOT_TITLE}: {}", series.country);
    let block = Block::default().title(title).borders(Borders::ALL);

    let (Some(first), Some(last)) = (series.left.first(), series.right.last()) else {
        f.render_widget(block, area);
        return;
    };
    let origin = *first;
    let x_max = x_of(origin, *last).max(1.0);
    let y_max = series.max_value().unwrap_or(0.0).max(1.0);
    let cursor = x_of(origin, selected.and_time(NaiveTime::MIN));

    let canvas = Canvas::default()
        .block(block)
        .x_bounds([0.0, x_max])
        .y_bounds([0.0, y_max])
        .paint(|ctx| {
            for kind in DRAW_ORDER {
                let color = series_color(kind);
                for ((left, right), value) in series.left.iter().zip(&series.right).zip(series.values(kind)) {
                    let Some(value) = value else { continue };
                    let x = x_of(origin, *left);
                    ctx.draw(&Rectangle {
                        x,
                        y: 0.0,
                        width: x_of(origin, *right) - x,
                        height: *value,
                        color,
                    });
                }
            }
            ctx.layer();
            ctx.draw(&ratatui::widgets::canvas::Line {
                x1: cursor,
                y1: 0.0,
                x2: cursor,
                y2: y_max,
                color: Color::White,
            });
            ctx.print(0.0, y_max, format!("{y_max:.0}"));
        });
    f.render_widget(canvas, area);
}

/// Legend line with the three series colors.
pub fn legend() -> TextLine<'static> {
    let spans: Vec<Span> = SeriesKind::ALL
        .iter()
        .flat_map(|kind| {
            [
                Span::styled("■ ", Style::default().fg(series_color(*kind))),
                Span::raw(format!("{}  ", kind.label())),
            ]
        })
        .collect();
    TextLine::from(spans)
}

/// Selected country's values on `date`: the map value, then one entry per series.
pub fn readout(series: &CountrySeries, date: NaiveDate, map_value: &str) -> String {
    let mut parts = vec![
        format!("{} {}", series.country, date.format(DISPLAY_FORMAT)),
        format!("Map: {map_value}"),
    ];
    for kind in SeriesKind::ALL {
        let value = series
            .value_at(kind, date)
            .map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.0}"));
        parts.push(format!("{}: {value}", kind.label()));
    }
    parts.join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_of_counts_days() {
        let origin = NaiveDate::from_ymd_opt(2020, 1, 22).unwrap().and_time(NaiveTime::MIN);
        let later = NaiveDate::from_ymd_opt(2020, 1, 24).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(x_of(origin, later), 2.5);
    }

    #[test]
    fn legend_lists_every_series() {
        let text: String = legend().spans.iter().map(|s| s.content.as_ref()).collect();
        for kind in SeriesKind::ALL {
            assert!(text.contains(kind.label()));
        }
    }

    #[test]
    fn readout_shows_values_and_no_data() {
        let day = |d| NaiveDate::from_ymd_opt(2020, 1, d).unwrap();
        let series = CountrySeries {
            country: "France".into(),
            index: vec![day(22), day(23)],
            cases: vec![Some(5.0), Some(7.0)],
            deaths: vec![Some(0.0), None],
            recovered: vec![None, None],
            ..Default::default()
        };

        assert_eq!(
            readout(&series, day(23), "7"),
            "France 01/23/2020  Map: 7  Confirmed cases: 7  Number of deaths: No data  \
             Number of people recovered: No data"
        );
        let off_index = readout(&series, day(30), NO_DATA);
        assert!(off_index.contains("Confirmed cases: No data"));
        assert!(off_index.contains("Map: No data"));
    }
}
