//! Application state management for the pointcast terminal UI
//!
//! This module holds the interactive session: keyboard handling, fetch
//! requests and the link to the [`WeatherController`] whose state the UI draws.

use std::sync::Arc;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};

use crate::data::Coordinate;
use crate::state::{DisplayState, WeatherController};

/// Main application struct for the interactive screen
pub struct App {
    /// Controller owning the displayed forecast state
    controller: Arc<WeatherController>,
    /// Location to forecast
    pub coordinate: Coordinate,
    /// Provider API key
    api_key: String,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a (re)fetch has been requested
    pub refresh_requested: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// When the last fetch was started
    pub last_refresh: Option<DateTime<Local>>,
}

impl App {
    /// Creates a new App; the first fetch is requested immediately
    pub fn new(controller: Arc<WeatherController>, coordinate: Coordinate, api_key: String) -> Self {
        Self {
            controller,
            coordinate,
            api_key,
            should_quit: false,
            refresh_requested: true,
            show_help: false,
            last_refresh: None,
        }
    }

    /// Snapshot of the state to render
    pub fn display_state(&self) -> DisplayState {
        self.controller.current()
    }

    /// Starts a pending fetch in the background, if one was requested
    ///
    /// Must be called from within a tokio runtime.
    pub fn poll_refresh(&mut self) {
        if !self.refresh_requested {
            return;
        }
        self.refresh_requested = false;
        self.last_refresh = Some(Local::now());

        let controller = Arc::clone(&self.controller);
        let coordinate = self.coordinate;
        let api_key = self.api_key.clone();
        tokio::spawn(async move {
            controller.request_fetch(coordinate, &api_key).await;
        });
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit the application
    /// - `Esc`: Close help, otherwise quit
    /// - `r`: Fetch the forecast again
    /// - `u`: Toggle between Celsius and Fahrenheit
    /// - `?`: Toggle help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') => {
                    self.show_help = false;
                }
                KeyCode::Char('q') => {
                    self.should_quit = true;
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                self.refresh_requested = true;
            }
            KeyCode::Char('u') => {
                self.controller.toggle_unit();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }
}
