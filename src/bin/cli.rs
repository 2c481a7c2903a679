use std::io::{self, Write};

use chrono::{Duration, Local, NaiveDate};
use polars::prelude::{AnyValue, DataFrame};
use tracing_subscriber::EnvFilter;
use trip_planner::{
    Attraction, AttractionId, DayWeather, Nationality, OpeningHours, PlannerConfig, SAMPLE_CITY,
    Setting, StaticCatalog, StaticForecast, TimeOfDay, TripPlanner, TripWindow,
    load_itinerary_from_csv, load_itinerary_from_json, load_planner_state_from_json,
    sample_catalog, save_itinerary_to_csv, save_itinerary_to_json, save_planner_state_to_json,
};

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Float64(v) => format!("{v:.2}"),
        AnyValue::Boolean(v) => if *v { "yes" } else { "" }.to_string(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let rows: Vec<Vec<String>> = (0..df.height())
        .map(|row| {
            columns
                .iter()
                .map(|col| col.get(row).map(|av| cell_text(&av)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = names.iter().map(|n| n.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len()) + 1));
            line.push('|');
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show the itinerary\n  list                               List attractions (after filters)\n  select   <id>                      Add an attraction to the plan\n  deselect <id>                      Remove an attraction from the plan\n  days     <n>                       Set number of planning days\n  persons  <n>                       Set number of travellers\n  nationality <indian|foreigner>     Set fee tier\n  edit <id> <day> <HH:MM> <HH:MM>    Move a visit by hand\n  weather <day> <good|bad>           Override the forecast for a day\n  filter <crowd|indoor|photo> <on|off>\n                                     Toggle an attraction filter\n  custom <id> <indoor|outdoor|both> <HH:MM-HH:MM> <minutes> <name;address;description>\n                                     Add a custom place\n  reallocate                         Discard manual edits and reschedule\n  warnings                           List visits that could not be placed cleanly\n  save <json|csv|state> <path>       Save itinerary or session state\n  load <json|csv|state> <path>       Load a saved itinerary or session state\n  quit|exit                          Exit"
    );
}

fn show(planner: &TripPlanner) {
    let itinerary = planner.itinerary();
    match itinerary.to_dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Render error: {}", e),
    }
    println!("{}", itinerary.to_cli_summary());
}

fn list(planner: &TripPlanner) {
    for attraction in planner.visible_attractions() {
        let marker = if planner.is_selected(&attraction.id) { "*" } else { " " };
        println!(
            "{} {:<16} {:<28} {:<8} {}",
            marker,
            attraction.id,
            attraction.name,
            attraction.setting.as_str(),
            attraction.hours(planner.config().default_opening_hours)
        );
    }
}

fn parse_custom(args: &[&str]) -> Result<Attraction, String> {
    let [id, setting, hours, minutes, rest @ ..] = args else {
        return Err("Usage: custom <id> <indoor|outdoor|both> <HH:MM-HH:MM> <minutes> <name;address;description>".into());
    };
    let setting = match setting.to_ascii_lowercase().as_str() {
        "indoor" => Setting::Indoor,
        "outdoor" => Setting::Outdoor,
        "both" => Setting::Both,
        _ => return Err("Invalid setting (indoor|outdoor|both)".into()),
    };
    let hours: OpeningHours = hours.parse().map_err(|e| format!("Invalid hours: {e}"))?;
    let minutes: u32 = minutes.parse().map_err(|_| "Invalid minutes".to_string())?;
    let text = rest.join(" ");
    let mut fields = text.split(';').map(str::trim);
    let name = fields.next().unwrap_or_default();
    let mut attraction = Attraction::new(*id, name, setting)
        .with_hours(hours)
        .with_duration(minutes);
    attraction.address = fields.next().unwrap_or_default().to_string();
    attraction.description = fields.next().unwrap_or_default().to_string();
    Ok(attraction)
}

fn env_date(name: &str, fallback: NaiveDate) -> NaiveDate {
    std::env::var(name)
        .ok()
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
        .unwrap_or(fallback)
}

fn build_planner() -> Result<TripPlanner, Box<dyn std::error::Error>> {
    let config = PlannerConfig::from_env()?;
    let catalog = match std::env::var_os("TRIP_PLANNER_CATALOG") {
        Some(path) => StaticCatalog::from_json_file(path)?,
        None => sample_catalog()?,
    };
    let city = std::env::var("TRIP_PLANNER_CITY").unwrap_or_else(|_| SAMPLE_CITY.to_string());
    let arrival = env_date("TRIP_PLANNER_ARRIVAL", Local::now().date_naive());
    let departure = env_date("TRIP_PLANNER_DEPARTURE", arrival + Duration::days(3));
    Ok(TripPlanner::load(
        &catalog,
        &StaticForecast::new(),
        &city,
        TripWindow::new(arrival, departure),
        config,
    )?)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut planner = match build_planner() {
        Ok(planner) => planner,
        Err(e) => {
            eprintln!("Startup error: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Trip Planner (CLI) - {} for {} days - type 'help' for commands\n",
        planner.city(),
        planner.num_days()
    );

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let (cmd, args) = match parts.split_first() {
            Some((cmd, args)) => (*cmd, args),
            None => continue,
        };

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => show(&planner),
            "list" => list(&planner),
            "select" => match args {
                [id] => match planner.select(*id) {
                    Ok(()) => {
                        println!("Selected {}.", id);
                        show(&planner);
                    }
                    Err(e) => println!("Error: {}", e),
                },
                _ => println!("Usage: select <id>"),
            },
            "deselect" => match args {
                [id] => {
                    if planner.deselect(&AttractionId::from(*id)) {
                        println!("Deselected {}.", id);
                        show(&planner);
                    } else {
                        println!("{} is not selected.", id);
                    }
                }
                _ => println!("Usage: deselect <id>"),
            },
            "days" => match args.first().map(|s| s.parse::<u32>()) {
                Some(Ok(n)) => {
                    if let Some(clamp) = planner.set_num_days(n) {
                        println!("Warning: {}", clamp);
                    }
                    println!("Planning {} days.", planner.num_days());
                    show(&planner);
                }
                _ => println!("Usage: days <n>"),
            },
            "persons" => match args.first().map(|s| s.parse::<u32>()) {
                Some(Ok(n)) if n >= 1 => {
                    planner.set_num_persons(n);
                    println!("Travellers set to {}.", planner.num_persons());
                    println!("{}", planner.itinerary().to_cli_summary());
                }
                _ => println!("Usage: persons <n> (n >= 1)"),
            },
            "nationality" => match args.first().map(|s| s.parse::<Nationality>()) {
                Some(Ok(nationality)) => {
                    planner.set_nationality(nationality);
                    println!("Nationality set to {}.", nationality);
                    println!("{}", planner.itinerary().to_cli_summary());
                }
                Some(Err(e)) => println!("Error: {}", e),
                None => println!("Usage: nationality <indian|foreigner>"),
            },
            "edit" => {
                let [id, day, start, end] = args else {
                    println!("Usage: edit <id> <day> <HH:MM> <HH:MM>");
                    continue;
                };
                let day: u32 = match day.parse() { Ok(v) => v, Err(_) => { println!("Invalid day"); continue; } };
                let start: TimeOfDay = match start.parse() { Ok(v) => v, Err(e) => { println!("Invalid start: {}", e); continue; } };
                let end: TimeOfDay = match end.parse() { Ok(v) => v, Err(e) => { println!("Invalid end: {}", e); continue; } };
                match planner.manual_override(&AttractionId::from(*id), day, start, end) {
                    Ok(visit) => {
                        println!("Moved {} to day {} {}-{}.", id, visit.day, visit.start, visit.end);
                        show(&planner);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "weather" => {
                let [day, kind] = args else {
                    println!("Usage: weather <day> <good|bad>");
                    continue;
                };
                let day: usize = match day.parse() {
                    Ok(v) if v >= 1 && v <= planner.num_days() as usize => v,
                    _ => { println!("Invalid day"); continue; }
                };
                let value = match kind.to_ascii_lowercase().as_str() {
                    "good" => DayWeather::good(),
                    "bad" => DayWeather::bad(),
                    _ => { println!("Invalid weather (good|bad)"); continue; }
                };
                let mut weather = planner.weather().to_vec();
                if weather.len() < day {
                    weather.resize(day, DayWeather::good());
                }
                weather[day - 1] = value;
                planner.set_weather(weather);
                println!("Day {} weather set to {}.", day, kind);
                show(&planner);
            }
            "filter" => {
                let [name, state] = args else {
                    println!("Usage: filter <crowd|indoor|photo> <on|off>");
                    continue;
                };
                let on = match state.to_ascii_lowercase().as_str() {
                    "on" => true,
                    "off" => false,
                    _ => { println!("Invalid state (on|off)"); continue; }
                };
                let mut filters = planner.filters();
                match name.to_ascii_lowercase().as_str() {
                    "crowd" => filters.avoid_crowd = on,
                    "indoor" => filters.indoor_only = on,
                    "photo" => filters.photography_only = on,
                    _ => { println!("Unknown filter (crowd|indoor|photo)"); continue; }
                }
                planner.set_filters(filters);
                list(&planner);
            }
            "custom" => match parse_custom(args) {
                Ok(attraction) => {
                    let id = attraction.id.clone();
                    match planner.add_custom_attraction(attraction) {
                        Ok(()) => println!("Added custom place {}.", id),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                Err(msg) => println!("{}", msg),
            },
            "reallocate" => {
                planner.reallocate();
                println!("Rescheduled.");
                show(&planner);
            }
            "warnings" => {
                if planner.warnings().is_empty() {
                    println!("No warnings.");
                }
                for warning in planner.warnings() {
                    println!("Warning: {}", warning);
                }
            }
            "save" => {
                let [kind, path] = args else {
                    println!("Usage: save <json|csv|state> <path>");
                    continue;
                };
                let res = match *kind {
                    "json" => save_itinerary_to_json(&planner.save_itinerary(), path),
                    "csv" => save_itinerary_to_csv(&planner.save_itinerary(), path),
                    "state" => save_planner_state_to_json(&planner.state(), path),
                    _ => { println!("Unknown format (json|csv|state)"); continue; }
                };
                match res {
                    Ok(()) => {
                        println!("Itinerary saved to {}.", path);
                        for (place, count) in planner.itinerary().place_counts() {
                            println!("  {}: {}", place, count);
                        }
                    }
                    Err(e) => println!("Save error: {}", e),
                }
            }
            "load" => {
                let [kind, path] = args else {
                    println!("Usage: load <json|csv|state> <path>");
                    continue;
                };
                match *kind {
                    "json" | "csv" => {
                        let res = if *kind == "json" {
                            load_itinerary_from_json(path)
                        } else {
                            load_itinerary_from_csv(path)
                        };
                        match res {
                            Ok(saved) => {
                                println!("Itinerary loaded from {} (saved {}).", path, saved.saved_at);
                                match saved.itinerary.to_dataframe() {
                                    Ok(df) => println!("{}", render_df_as_text_table(&df)),
                                    Err(e) => println!("Render error: {}", e),
                                }
                                println!("{}", saved.itinerary.to_cli_summary());
                            }
                            Err(e) => println!("Load error: {}", e),
                        }
                    }
                    "state" => match load_planner_state_from_json(path) {
                        Ok(state) => {
                            if let Some(clamp) = planner.restore_state(state) {
                                println!("Warning: {}", clamp);
                            }
                            println!("Session restored from {}.", path);
                            show(&planner);
                        }
                        Err(e) => println!("Load error: {}", e),
                    },
                    _ => println!("Unknown format (json|csv|state)"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
