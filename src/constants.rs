use ratatui::style::Color;

pub const COLORS: [Color; 12] = [
    Color::Rgb(0, 176, 80),
    Color::Rgb(128, 255, 0),
    Color::Rgb(255, 255, 0),
    Color::Rgb(255, 204, 0),
    Color::Rgb(255, 153, 0),
    Color::Rgb(255, 51, 0),
    Color::Rgb(255, 0, 0),
    Color::Rgb(153, 0, 255),
    Color::Rgb(102, 51, 255),
    Color::Rgb(0, 0, 255),
    Color::Rgb(0, 153, 255),
    Color::Rgb(0, 255, 255),
];

pub const VIEW_DEFAULTS: ViewDefaults = ViewDefaults {
    day_start_hour: 8,
    day_end_hour: 20,
    rows_per_hour: 4,
    grid_minutes: crate::time::DEFAULT_GRID_MINUTES,
};

pub const UI_SETTINGS: UiSettings = UiSettings {
    tick_ms: 1000,
    poll_ms: 50,
    gutter_width: 6,
    scroll_rows: 4,
};

pub const FILE_PATHS: FilePaths = FilePaths {
    local_config: "daygrid.json",
    config: "config.json",
};

pub struct ViewDefaults {
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub rows_per_hour: u16,
    pub grid_minutes: u32,
}

pub struct UiSettings {
    pub tick_ms: u64,
    pub poll_ms: u64,
    pub gutter_width: u16,
    pub scroll_rows: u16,
}

pub struct FilePaths {
    pub local_config: &'static str,
    pub config: &'static str,
}
