use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};

use covid_atlas::dates::DISPLAY_FORMAT;

use crate::bar_chart;
use crate::map_draw::ColorScale;
use crate::state::{AppState, Panel};

fn panel_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

pub fn draw(f: &mut Frame, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(1), Constraint::Length(3)])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Length(2), Constraint::Min(5)])
        .split(columns[1]);

    let dashboard = &state.dashboard;
    let map = dashboard.map();
    let selected = dashboard.state().selected_country.as_str();

    // Map and color bar
    state.map.render(f, left[0], &map.title, &map.snapshot, &state.scale, Some(selected));
    f.render_widget(Paragraph::new(color_bar(&state.scale)), left[1]);

    // Date slider
    let (start, end) = dashboard.data().date_range();
    let total = (end - start).num_days().max(1) as f64;
    let ratio = ((map.date - start).num_days() as f64 / total).clamp(0.0, 1.0);
    let slider = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Date")
                .border_style(panel_style(state.active_panel == Panel::Map)),
        )
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(ratio)
        .label(map.date.format(DISPLAY_FORMAT).to_string());
    f.render_widget(slider, left[2]);

    // Bar chart, legend and readout
    bar_chart::render(f, right[0], &dashboard.bar().series, map.date);
    let legend = vec![bar_chart::legend(), Line::raw(state.readout())];
    f.render_widget(Paragraph::new(legend), right[1]);

    // Country selector
    let items: Vec<ListItem> = dashboard
        .data()
        .countries()
        .iter()
        .map(|c| {
            let style = if c == selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(c.clone()).style(style)
        })
        .collect();
    let mut list_state = ListState::default();
    list_state.select(Some(state.cursor));
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select country")
                .border_style(panel_style(state.active_panel == Panel::Countries)),
        )
        .highlight_symbol(">> ")
        .highlight_style(Style::default().fg(Color::Cyan));
    f.render_stateful_widget(list, right[2], &mut list_state);

    // Status
    f.render_widget(
        Paragraph::new(state.status()).style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );
}

/// Palette swatches between the low and high ends of the scale.
fn color_bar(scale: &ColorScale) -> Line<'static> {
    let mut spans = vec![Span::raw(format!("{:.0} ", scale.low))];
    spans.extend(
        ColorScale::palette()
            .iter()
            .map(|color| Span::styled("██", Style::default().fg(*color))),
    );
    spans.push(Span::raw(format!(" {:.0}  ", scale.high)));
    spans.push(Span::styled("██", Style::default().fg(crate::map_draw::NAN_COLOR)));
    spans.push(Span::raw(format!(" {}", covid_atlas::snapshot::NO_DATA)));
    Line::from(spans)
}
