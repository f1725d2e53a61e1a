use std::{
    io,
    path::{Path, PathBuf},
};

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    app,
    config::{self, ViewSettings},
    domain::{Entry, LayoutResult},
    fixtures,
    layout::layout,
    storage, time,
};

#[derive(Parser, Debug)]
#[command(name = "daygrid")]
#[command(about = "Side-by-side layout for a day of overlapping entries", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "More log output")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Print the column layout of a day")]
    Layout {
        #[arg(help = "Entry file (.csv or .json)")]
        file: PathBuf,

        #[arg(long, help = "Day to lay out: a weekday, a date, or 'today'")]
        day: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table, help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output path")]
        out: Option<PathBuf>,

        #[command(flatten)]
        view: ViewArgs,
    },

    #[command(about = "Browse a day in the terminal")]
    Show {
        #[arg(help = "Entry file (.csv or .json)")]
        file: PathBuf,

        #[arg(long, help = "Day to show: a weekday, a date, or 'today'")]
        day: Option<String>,

        #[command(flatten)]
        view: ViewArgs,
    },

    #[command(about = "Run the built-in layout fixtures")]
    Verify,

    #[command(about = "Round a time to the nearest grid slot")]
    Snap {
        #[arg(help = "Time as HH:MM")]
        time: String,

        #[arg(long, help = "Grid size in minutes")]
        grid: Option<u32>,
    },

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    #[arg(long, help = "First visible hour")]
    pub start_hour: Option<u32>,

    #[arg(long, help = "Hour the view ends at")]
    pub end_hour: Option<u32>,

    #[arg(long, help = "Terminal rows per hour")]
    pub rows_per_hour: Option<u16>,

    #[arg(long, help = "Cursor grid in minutes")]
    pub grid: Option<u32>,
}

impl ViewArgs {
    pub fn apply(&self, base: ViewSettings) -> Result<ViewSettings, String> {
        ViewSettings {
            day_start_hour: self.start_hour.unwrap_or(base.day_start_hour),
            day_end_hour: self.end_hour.unwrap_or(base.day_end_hour),
            rows_per_hour: self.rows_per_hour.unwrap_or(base.rows_per_hour),
            grid_minutes: self.grid.unwrap_or(base.grid_minutes),
        }
        .validate()
        .map_err(|e| e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRow {
    pub instance_id: String,
    pub start_time: String,
    pub end_time: String,
    pub column: usize,
    pub columns: usize,
    pub top: f64,
    pub height: f64,
}

/// Joins layout with geometry, in input order.
pub fn build_layout_rows(
    entries: &[Entry],
    result: &LayoutResult,
    settings: &ViewSettings,
) -> Result<Vec<LayoutRow>, String> {
    entries
        .iter()
        .map(|entry| {
            let placement = result
                .get(&entry.instance_id)
                .ok_or_else(|| format!("Entry '{}' missing from layout", entry.instance_id))?;
            let duration = entry.duration_minutes().map_err(|e| e.to_string())?;
            let pos = time::position(
                &entry.start_time,
                duration,
                settings.day_start_hour,
                settings.pixels_per_minute(),
            )
            .map_err(|e| e.to_string())?;

            Ok(LayoutRow {
                instance_id: entry.instance_id.clone(),
                start_time: entry.start_time.clone(),
                end_time: entry.end_time.clone(),
                column: placement.column,
                columns: placement.columns,
                top: pos.top,
                height: pos.height,
            })
        })
        .collect()
}

pub fn format_table(rows: &[LayoutRow]) -> String {
    let mut table = String::new();
    table.push_str(&format!(
        "{:20} {:>5} {:>5} {:>6} {:>7} {:>7} {:>7}\n",
        "ID", "START", "END", "COLUMN", "COLUMNS", "TOP", "HEIGHT"
    ));
    table.push_str(&format!("{}\n", "-".repeat(62)));
    for row in rows {
        table.push_str(&format!(
            "{:20} {:>5} {:>5} {:>6} {:>7} {:>7.2} {:>7.2}\n",
            row.instance_id,
            row.start_time,
            row.end_time,
            row.column,
            row.columns,
            row.top,
            row.height
        ));
    }
    table
}

/// Maps `--day` to the designations a record may carry.
pub fn resolve_day(day: Option<&str>) -> (Vec<String>, String) {
    match day {
        None => (Vec::new(), "all entries".to_string()),
        Some(d) if d.eq_ignore_ascii_case("today") => {
            let designations = storage::today_designations();
            let label = designations.first().cloned().unwrap_or_default();
            (designations, label)
        }
        Some(d) => (vec![d.to_string()], d.to_string()),
    }
}

fn load_day(
    file: &Path,
    day: Option<&str>,
    view: &ViewArgs,
) -> Result<(Vec<Entry>, LayoutResult, ViewSettings, String), String> {
    let settings = view.apply(config::load_settings(&config::get_config_path()))?;
    let (designations, label) = resolve_day(day);

    let records = storage::load_records(file).map_err(|e| e.to_string())?;
    let entries =
        storage::entries_for_day(records, &designations).map_err(|e| e.to_string())?;
    let result = layout(&entries).map_err(|e| e.to_string())?;

    info!(day = %label, entries = entries.len(), "laid out day");
    Ok((entries, result, settings, label))
}

pub fn print_layout(
    file: PathBuf,
    day: Option<String>,
    format: OutputFormat,
    out_path: Option<PathBuf>,
    view: ViewArgs,
) -> Result<(), String> {
    let (entries, result, settings, _) = load_day(&file, day.as_deref(), &view)?;
    let rows = build_layout_rows(&entries, &result, &settings)?;

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&rows).map_err(|e| e.to_string())?,
        OutputFormat::Table => format_table(&rows),
    };

    if let Some(path) = out_path {
        storage::atomic_write(&path, &rendered).map_err(|e| e.to_string())?;
        println!("Wrote layout to {}", path.display());
    } else {
        println!("{}", rendered);
    }
    Ok(())
}

pub fn show_day(file: PathBuf, day: Option<String>, view: ViewArgs) -> Result<(), String> {
    let (entries, result, settings, label) = load_day(&file, day.as_deref(), &view)?;
    app::run_ui(entries, result, settings, label).map_err(|e| e.to_string())
}

pub fn verify_fixtures() -> Result<(), String> {
    let outcomes = fixtures::verify_all();
    let mut failed = 0;

    for (name, outcome) in &outcomes {
        match outcome {
            Ok(()) => println!("ok    {}", name),
            Err(e) => {
                failed += 1;
                println!("FAIL  {}: {}", name, e);
            }
        }
    }

    println!("{}", "-".repeat(40));
    println!("{} fixtures, {} failed", outcomes.len(), failed);

    if failed > 0 {
        Err(format!("{} fixture(s) failed", failed))
    } else {
        Ok(())
    }
}

pub fn snap(value: &str, grid: Option<u32>) -> Result<String, String> {
    let grid = grid.unwrap_or(config::load_settings(&config::get_config_path()).grid_minutes);
    if grid == 0 {
        return Err("Grid must be at least one minute".to_string());
    }
    let minutes = time::minutes_from_midnight(value).map_err(|e| e.to_string())?;
    let snapped = time::snap_to_grid(minutes, grid).min(time::MINUTES_PER_DAY);
    Ok(time::time_from_minutes(snapped))
}

pub fn print_completions(shell: &str) -> Result<(), String> {
    use clap_complete::Shell;
    let shell = match shell {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        _ => {
            return Err(format!(
                "Unsupported shell: {}. Use bash, zsh, or fish.",
                shell
            ));
        }
    };
    clap_complete::generate(shell, &mut Cli::command(), "daygrid", &mut io::stdout());
    Ok(())
}

pub fn run_cli(cli: Cli) {
    let outcome = match cli.command {
        Command::Layout {
            file,
            day,
            format,
            out,
            view,
        } => print_layout(file, day, format, out, view),
        Command::Show { file, day, view } => show_day(file, day, view),
        Command::Verify => verify_fixtures(),
        Command::Snap { time, grid } => snap(&time, grid).map(|snapped| println!("{}", snapped)),
        Command::Completions { shell } => print_completions(&shell),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Placement;

    #[test]
    fn test_cli_parses_layout_command() {
        let cli = Cli::try_parse_from([
            "daygrid",
            "layout",
            "week.csv",
            "--day",
            "Monday",
            "--format",
            "json",
            "--start-hour",
            "7",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        let Command::Layout {
            file,
            day,
            format,
            view,
            ..
        } = cli.command
        else {
            panic!("expected layout command");
        };
        assert_eq!(file, PathBuf::from("week.csv"));
        assert_eq!(day.as_deref(), Some("Monday"));
        assert_eq!(format, OutputFormat::Json);
        assert_eq!(view.start_hour, Some(7));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_view_args_override_and_validate() {
        let args = ViewArgs {
            start_hour: Some(6),
            rows_per_hour: Some(2),
            ..ViewArgs::default()
        };
        let settings = args.apply(ViewSettings::default()).unwrap();
        assert_eq!(settings.day_start_hour, 6);
        assert_eq!(settings.rows_per_hour, 2);
        assert_eq!(settings.day_end_hour, 20);

        let inverted = ViewArgs {
            start_hour: Some(21),
            ..ViewArgs::default()
        };
        assert!(inverted.apply(ViewSettings::default()).is_err());
    }

    #[test]
    fn test_layout_rows_carry_geometry() {
        let entries = vec![
            Entry::new("long", "09:00", "12:00"),
            Entry::new("short", "09:30", "10:00"),
        ];
        let result = layout(&entries).unwrap();
        let settings = ViewSettings {
            rows_per_hour: 60,
            ..ViewSettings::default()
        };

        let rows = build_layout_rows(&entries, &result, &settings).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].instance_id, "long");
        assert_eq!((rows[0].column, rows[0].columns), (0, 2));
        assert_eq!(rows[0].top, 60.0);
        assert_eq!(rows[0].height, 180.0);
        assert_eq!((rows[1].column, rows[1].columns), (1, 2));
        assert_eq!(rows[1].top, 90.0);
    }

    #[test]
    fn test_layout_rows_require_placement() {
        let entries = vec![Entry::new("ghost", "09:00", "10:00")];
        let mut result = LayoutResult::new();
        assert!(build_layout_rows(&entries, &result, &ViewSettings::default()).is_err());

        result.insert("ghost".to_string(), Placement::new(0, 1));
        assert!(build_layout_rows(&entries, &result, &ViewSettings::default()).is_ok());
    }

    #[test]
    fn test_table_lists_every_row() {
        let rows = vec![LayoutRow {
            instance_id: "a".to_string(),
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            column: 0,
            columns: 1,
            top: 4.0,
            height: 4.0,
        }];
        let table = format_table(&rows);
        assert_eq!(table.lines().count(), 3);
        assert!(table.lines().nth(2).unwrap().starts_with("a "));
    }

    #[test]
    fn test_snap_uses_grid() {
        assert_eq!(snap("09:08", Some(15)), Ok("09:15".to_string()));
        assert_eq!(snap("09:07", Some(15)), Ok("09:00".to_string()));
        assert_eq!(snap("23:55", Some(30)), Ok("24:00".to_string()));
        assert!(snap("9.07", Some(15)).is_err());
        assert!(snap("09:07", Some(0)).is_err());
    }

    #[test]
    fn test_resolve_day() {
        assert_eq!(resolve_day(None).0, Vec::<String>::new());
        assert_eq!(
            resolve_day(Some("Tuesday")),
            (vec!["Tuesday".to_string()], "Tuesday".to_string())
        );
        assert_eq!(resolve_day(Some("today")).0.len(), 3);
    }

    #[test]
    fn test_verify_fixtures_passes() {
        assert_eq!(verify_fixtures(), Ok(()));
    }
}
