//! pointcast - point forecast in the terminal
//!
//! Fetches the Windy point forecast for a coordinate and shows current
//! conditions, the next hours and the coming days, either in an interactive
//! terminal UI or as a one-shot report.

use std::io;
use std::panic;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use pointcast::app::App;
use pointcast::cli::{Cli, OutputMode, StartupConfig};
use pointcast::data::{NoGeocoder, NominatimGeocoder, ReverseGeocoder, WindyClient};
use pointcast::logging;
use pointcast::report;
use pointcast::state::{DisplayState, WeatherController};
use pointcast::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current display state
fn render_ui(frame: &mut ratatui::Frame, app: &App) {
    ui::render_forecast(frame, &app.display_state());
    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Builds the controller described by the startup configuration
fn build_controller(config: &StartupConfig) -> WeatherController {
    let mut client = WindyClient::with_timeout(config.timeout);
    if let Some(url) = &config.api_url {
        client = client.with_base_url(url.clone());
    }

    let geocoder: Arc<dyn ReverseGeocoder> = if config.geocode {
        Arc::new(NominatimGeocoder::new())
    } else {
        Arc::new(NoGeocoder)
    };

    WeatherController::with_geocoder(client, geocoder).with_default_unit(config.unit)
}

/// Fetches once and prints the result; errors go to stderr with a failing exit code
async fn run_once(config: &StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    let controller = build_controller(config);
    controller
        .request_fetch(config.coordinate, &config.api_key)
        .await;

    match controller.current() {
        DisplayState::Success { summary, unit } => {
            let output = match config.output {
                OutputMode::Json => report::render_json(&summary)?,
                OutputMode::Text | OutputMode::Interactive => report::render_text(&summary, unit),
            };
            print!("{}", output);
            if config.output == OutputMode::Json {
                println!();
            }
            Ok(())
        }
        DisplayState::Error(message) => Err(message.into()),
        DisplayState::Empty | DisplayState::Loading => Err("forecast fetch did not complete".into()),
    }
}

async fn run_interactive(config: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = logging::default_log_dir() {
        // Logging is optional; the UI still runs without a writable cache dir
        let _ = logging::init_file(&dir);
    }
    tracing::info!(coordinate = %config.coordinate, "starting interactive session");

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    let controller = Arc::new(build_controller(&config));
    let mut app = App::new(controller, config.coordinate, config.api_key.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    loop {
        // Start any requested fetch
        app.poll_refresh();

        // Render UI
        terminal.draw(|f| render_ui(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    tracing::info!("session ended");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    match config.output {
        OutputMode::Interactive => run_interactive(config).await,
        OutputMode::Text | OutputMode::Json => {
            logging::init_stderr();
            if let Err(e) = run_once(&config).await {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
