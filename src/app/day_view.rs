use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::{
    config::ViewSettings,
    constants::UI_SETTINGS,
    domain::{Entry, LayoutResult, Placement},
    time,
};

use super::ui_helpers::{entry_color, text_color_for_bg, truncate_label};

const ROW_EPSILON: f64 = 1e-9;

/// A single day drawn as an hour gutter plus side-by-side entry blocks.
pub struct DayView<'a> {
    entries: &'a [Entry],
    layout: &'a LayoutResult,
    settings: ViewSettings,
    scroll: u16,
    cursor: Option<u32>,
    now: Option<u32>,
}

impl<'a> DayView<'a> {
    pub fn new(entries: &'a [Entry], layout: &'a LayoutResult, settings: ViewSettings) -> Self {
        Self {
            entries,
            layout,
            settings,
            scroll: 0,
            cursor: None,
            now: None,
        }
    }

    pub fn scroll(mut self, rows: u16) -> Self {
        self.scroll = rows;
        self
    }

    pub fn cursor(mut self, minutes: Option<u32>) -> Self {
        self.cursor = minutes;
        self
    }

    pub fn now(mut self, minutes: Option<u32>) -> Self {
        self.now = minutes;
        self
    }

    /// Rows `[top, bottom)` relative to the start of the day window.
    fn entry_rows(&self, entry: &Entry) -> Option<(i64, i64)> {
        let duration = entry.duration_minutes().ok()?;
        let pos = time::position(
            &entry.start_time,
            duration,
            self.settings.day_start_hour,
            self.settings.pixels_per_minute(),
        )
        .ok()?;

        let top = (pos.top + ROW_EPSILON).floor() as i64;
        let bottom = ((pos.top + pos.height - ROW_EPSILON).ceil() as i64).max(top + 1);
        Some((top, bottom))
    }

    fn visible_rows(&self, top: i64, bottom: i64, area: Rect) -> Option<(u16, u16)> {
        let scroll = self.scroll as i64;
        let top = (top - scroll).max(0);
        let bottom = (bottom - scroll).min(area.height as i64);
        if bottom <= top {
            return None;
        }
        // Both ends now lie within 0..=area.height.
        Some((area.y.saturating_add(top as u16), (bottom - top) as u16))
    }

    fn entry_rect(&self, entry: &Entry, placement: Placement, events: Rect) -> Option<Rect> {
        let (top, bottom) = self.entry_rows(entry)?;
        let (y, height) = self.visible_rows(top, bottom, events)?;

        let columns = placement.columns.max(1) as u32;
        let column = placement.column as u32;
        let width = events.width as u32;
        let left = events.x + (width * column / columns) as u16;
        let right = events.x + (width * (column + 1) / columns) as u16;

        let mut block_width = right.saturating_sub(left);
        if column + 1 < columns && block_width > 1 {
            block_width -= 1;
        }
        if block_width == 0 {
            return None;
        }

        Some(Rect::new(left, y, block_width, height))
    }

    fn minute_row(&self, minutes: u32, area: Rect) -> Option<u16> {
        let (window_start, window_end) = self.settings.window_minutes();
        if minutes < window_start || minutes >= window_end {
            return None;
        }
        let row = ((minutes - window_start) * self.settings.rows_per_hour as u32 / 60) as i64;
        self.visible_rows(row, row + 1, area).map(|(y, _)| y)
    }

    fn render_gutter(&self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::Gray);
        for hour in self.settings.day_start_hour..self.settings.day_end_hour {
            let row = ((hour - self.settings.day_start_hour) * self.settings.rows_per_hour as u32)
                as i64;
            if let Some((y, _)) = self.visible_rows(row, row + 1, area) {
                buf.set_string(area.x, y, format!("{:02}:00", hour), style);
            }
        }
    }
}

impl Widget for DayView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let gutter = UI_SETTINGS.gutter_width;
        if area.width <= gutter || area.height == 0 {
            return;
        }

        self.render_gutter(area, buf);

        let events = Rect::new(area.x + gutter, area.y, area.width - gutter, area.height);
        for (index, entry) in self.entries.iter().enumerate() {
            let Some(placement) = self.layout.get(&entry.instance_id) else {
                continue;
            };
            let Some(rect) = self.entry_rect(entry, *placement, events) else {
                continue;
            };

            let bg = entry_color(entry.color.as_deref(), index);
            let style = Style::default().bg(bg).fg(text_color_for_bg(bg));
            buf.set_style(rect, style);

            let label = if entry.title.is_empty() {
                &entry.instance_id
            } else {
                &entry.title
            };
            let text = truncate_label(label, rect.width as usize);
            buf.set_stringn(rect.x, rect.y, text, rect.width as usize, style);
        }

        if let Some(y) = self.now.and_then(|now| self.minute_row(now, area)) {
            buf.set_style(
                Rect::new(area.x, y, area.width, 1),
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::UNDERLINED),
            );
        }

        if let Some(cursor) = self.cursor
            && let Some(y) = self.minute_row(cursor, area)
        {
            buf.set_string(
                area.x,
                y,
                time::time_from_minutes(cursor),
                Style::default().add_modifier(Modifier::REVERSED),
            );
        }
    }
}
