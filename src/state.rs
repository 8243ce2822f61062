use crossterm::event::KeyCode;
use std::cell::RefCell;
use std::rc::Rc;

use covid_atlas::dashboard::{Dashboard, ViewListener, ViewUpdate};
use covid_atlas::dates::DISPLAY_FORMAT;
use covid_atlas::snapshot::{NO_DATA, SnapshotFeature};

use crate::bar_chart;
use crate::map_draw::{ColorScale, MapView};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    Countries,
    Map,
}

/// Mirrors the latest published view into the status bar.
struct StatusListener(Rc<RefCell<String>>);

impl ViewListener for StatusListener {
    fn on_update(&mut self, update: &ViewUpdate) {
        let text = match update {
            ViewUpdate::Map(map) => format!("Date: {}", map.date.format(DISPLAY_FORMAT)),
            ViewUpdate::Bar(bar) => format!("Country: {}", bar.country),
        };
        *self.0.borrow_mut() = text;
    }
}

pub struct AppState {
    pub dashboard: Dashboard,
    pub map: MapView,
    pub scale: ColorScale,
    /// Cursor in the country list, not necessarily the selected country.
    pub cursor: usize,
    pub active_panel: Panel,
    status: Rc<RefCell<String>>,
}

impl AppState {
    pub const HELP_TEXT: &'static str =
        "←/→ day  PgUp/PgDn week  Home/End  ↑/↓ list  Enter select  Tab panel  q quit";

    pub fn new(mut dashboard: Dashboard) -> Self {
        let map = MapView::new(dashboard.data().geometry());
        let scale = ColorScale::new(dashboard.data().color_range());
        let cursor = dashboard
            .data()
            .countries()
            .iter()
            .position(|c| *c == dashboard.state().selected_country)
            .unwrap_or(0);
        let status = Rc::new(RefCell::new(Self::HELP_TEXT.to_string()));
        dashboard.add_listener(Box::new(StatusListener(Rc::clone(&status))));
        tracing::debug!(features = map.feature_count(), "Map view ready");

        Self {
            dashboard,
            map,
            scale,
            cursor,
            active_panel: Panel::Countries,
            status,
        }
    }

    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    /// Selected country on the selected date, as shown under the bar chart.
    pub fn readout(&self) -> String {
        let map = self.dashboard.map();
        let bar = self.dashboard.bar();
        let map_value = map
            .snapshot
            .feature(&bar.country)
            .map_or_else(|| NO_DATA.to_string(), SnapshotFeature::display_value);
        bar_chart::readout(&bar.series, map.date, &map_value)
    }

    fn set_status(&self, text: String) {
        *self.status.borrow_mut() = text;
    }

    /// Returns true when the user asked to quit.
    pub fn handle_input(&mut self, key: KeyCode) -> bool {
        use KeyCode::{BackTab, Char, Down, End, Enter, Esc, Home, Left, PageDown, PageUp, Right, Tab, Up};
        let count = self.dashboard.data().countries().len();
        match key {
            Char('q') | Esc => return true,
            Tab | BackTab => {
                self.active_panel = match self.active_panel {
                    Panel::Countries => Panel::Map,
                    Panel::Map => Panel::Countries,
                };
            }
            Left => {
                self.dashboard.step_date(-1);
            }
            Right => {
                self.dashboard.step_date(1);
            }
            PageUp => {
                self.dashboard.step_date(-7);
            }
            PageDown => {
                self.dashboard.step_date(7);
            }
            Home => {
                let (start, _) = self.dashboard.data().date_range();
                self.dashboard.set_date(start);
            }
            End => {
                let (_, end) = self.dashboard.data().date_range();
                self.dashboard.set_date(end);
            }
            Up => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            Down => {
                if self.cursor + 1 < count {
                    self.cursor += 1;
                }
            }
            Enter => {
                let Some(choice) = self.dashboard.data().countries().get(self.cursor).cloned() else {
                    return false;
                };
                if let Err(e) = self.dashboard.set_country(&choice) {
                    self.set_status(e.to_string());
                }
            }
            _ => {}
        }
        false
    }
}
