use std::{
    io,
    time::{Duration, Instant},
};

use chrono::Local;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::Alignment,
    prelude::{Line, Span},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders},
};
use tracing::debug;

use crate::{
    config::ViewSettings,
    constants::UI_SETTINGS,
    domain::{Entry, LayoutResult},
    time,
};

pub mod day_view;
mod event_handlers;
pub(crate) mod ui_helpers;

pub use day_view::DayView;

struct App {
    entries: Vec<Entry>,
    layout: LayoutResult,
    settings: ViewSettings,
    day_label: String,
    scroll: u16,
    cursor: u32,
    viewport_rows: u16,
    render_needed: bool,
}

impl App {
    fn new(
        entries: Vec<Entry>,
        layout: LayoutResult,
        settings: ViewSettings,
        day_label: String,
    ) -> Self {
        let mut app = Self {
            entries,
            layout,
            settings,
            day_label,
            scroll: 0,
            cursor: 0,
            viewport_rows: 0,
            render_needed: true,
        };
        app.jump_to_now();
        app
    }

    fn now_minutes() -> u32 {
        time::minutes_of(Local::now().time())
    }

    /// Cursor on the grid slot nearest to now, clamped into the day window.
    fn jump_to_now(&mut self) {
        let (window_start, window_end) = self.settings.window_minutes();
        let snapped = time::snap_to_grid(Self::now_minutes(), self.settings.grid_minutes);
        let last_slot = window_end.saturating_sub(self.settings.grid_minutes);
        self.cursor = snapped.clamp(window_start, last_slot.max(window_start));
        self.follow_cursor();
    }

    fn move_cursor(&mut self, steps: i64) {
        let (window_start, window_end) = self.settings.window_minutes();
        let grid = self.settings.grid_minutes as i64;
        let moved = self.cursor as i64 + steps * grid;
        let last_slot = window_end as i64 - grid;
        let clamped = moved.clamp(window_start as i64, last_slot.max(window_start as i64));
        self.cursor = time::snap_to_grid(clamped as u32, self.settings.grid_minutes);
        self.follow_cursor();
    }

    fn scroll_by(&mut self, rows: i32) {
        let max_scroll = self
            .settings
            .total_rows()
            .saturating_sub(self.viewport_rows.max(1));
        let scrolled = (self.scroll as i32 + rows).clamp(0, max_scroll as i32);
        self.scroll = scrolled as u16;
        self.render_needed = true;
    }

    fn cursor_row(&self) -> u16 {
        let (window_start, _) = self.settings.window_minutes();
        let row = self.cursor.saturating_sub(window_start) as u64
            * self.settings.rows_per_hour as u64
            / 60;
        u16::try_from(row).unwrap_or(u16::MAX)
    }

    fn follow_cursor(&mut self) {
        let row = self.cursor_row();
        let visible = self.viewport_rows.max(1);
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll.saturating_add(visible) {
            self.scroll = row + 1 - visible;
        }
        self.render_needed = true;
    }

    /// Titles of the entries running at the cursor.
    fn entries_at_cursor(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| {
                let start = time::minutes_from_midnight(&entry.start_time);
                let end = time::minutes_from_midnight(&entry.end_time);
                matches!((start, end), (Ok(s), Ok(e)) if s <= self.cursor && self.cursor < e)
            })
            .map(|entry| {
                if entry.title.is_empty() {
                    entry.instance_id.as_str()
                } else {
                    entry.title.as_str()
                }
            })
            .collect()
    }

    fn draw_frame(&mut self, f: &mut Frame) {
        let size = f.size();
        let inner_height = size.height.saturating_sub(2);
        if inner_height != self.viewport_rows {
            self.viewport_rows = inner_height;
            self.follow_cursor();
        }

        let running = self.entries_at_cursor().join(", ");
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(
                Line::from(Span::styled(
                    self.day_label.as_str(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Left),
            )
            .title(
                Line::from(Span::styled(
                    time::time_from_minutes(self.cursor),
                    Style::default().fg(Color::White),
                ))
                .alignment(Alignment::Center),
            )
            .title(
                Line::from(Span::styled(
                    running,
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::ITALIC),
                ))
                .alignment(Alignment::Right),
            );

        let inner = block.inner(size);
        f.render_widget(block, size);

        let view = DayView::new(&self.entries, &self.layout, self.settings)
            .scroll(self.scroll)
            .cursor(Some(self.cursor))
            .now(Some(Self::now_minutes()));
        f.render_widget(view, inner);
    }
}

pub fn run_ui(
    entries: Vec<Entry>,
    layout: LayoutResult,
    settings: ViewSettings,
    day_label: String,
) -> Result<(), io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(entries, layout, settings, day_label);
    debug!(entries = app.entries.len(), "day view started");

    let tick_rate = Duration::from_millis(UI_SETTINGS.tick_ms);
    let poll_rate = Duration::from_millis(UI_SETTINGS.poll_ms);
    let mut last_tick = Instant::now();

    loop {
        if last_tick.elapsed() >= tick_rate {
            // Keeps the now line moving.
            app.render_needed = true;
            last_tick = Instant::now();
        }

        if app.render_needed {
            terminal.draw(|f| app.draw_frame(f))?;
            app.render_needed = false;
        }

        if event::poll(poll_rate)?
            && let Event::Key(key) = event::read()?
            && app.handle_key(key)
        {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout;

    fn app_with(entries: Vec<Entry>) -> App {
        let result = layout(&entries).unwrap();
        let mut app = App::new(entries, result, ViewSettings::default(), "Monday".to_string());
        app.viewport_rows = 8;
        app.scroll = 0;
        app.cursor = 9 * 60;
        app
    }

    #[test]
    fn test_move_cursor_steps_by_grid_and_clamps() {
        let mut app = app_with(Vec::new());

        app.move_cursor(2);
        assert_eq!(app.cursor, 9 * 60 + 30);

        app.move_cursor(-100);
        assert_eq!(app.cursor, 8 * 60);

        app.move_cursor(1000);
        assert_eq!(app.cursor, 20 * 60 - 15);
    }

    #[test]
    fn test_cursor_stays_visible() {
        let mut app = app_with(Vec::new());
        app.move_cursor(12);
        // 12:00 is row 16 with four rows per hour.
        assert_eq!(app.cursor_row(), 16);
        assert_eq!(app.scroll, 9);

        app.move_cursor(-16);
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut app = app_with(Vec::new());
        app.scroll_by(-5);
        assert_eq!(app.scroll, 0);
        app.scroll_by(1000);
        assert_eq!(app.scroll, 48 - 8);
    }

    #[test]
    fn test_dense_grid_keeps_cursor_in_range() {
        let settings = ViewSettings {
            day_start_hour: 0,
            day_end_hour: 24,
            rows_per_hour: 2730,
            grid_minutes: 15,
        };
        let mut app = App::new(Vec::new(), LayoutResult::new(), settings, "Monday".to_string());
        app.viewport_rows = 8;
        app.scroll = 0;
        app.cursor = 0;

        app.move_cursor(1000);
        assert_eq!(app.cursor, 23 * 60 + 45);
        assert_eq!(app.cursor_row(), 64837);
        assert_eq!(app.scroll, 64837 + 1 - 8);

        app.scroll_by(1000);
        assert_eq!(app.scroll, 65520 - 8);
    }

    #[test]
    fn test_entries_at_cursor_uses_half_open_intervals() {
        let mut app = app_with(vec![
            Entry::new("a", "09:00", "10:00").with_title("Maths"),
            Entry::new("b", "08:00", "09:00").with_title("Physics"),
            Entry::new("c", "09:00", "09:30"),
        ]);
        assert_eq!(app.entries_at_cursor(), vec!["Maths", "c"]);

        app.cursor = 9 * 60 + 30;
        assert_eq!(app.entries_at_cursor(), vec!["Maths"]);
    }
}
