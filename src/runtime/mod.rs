use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::backend::Loader;
use crate::logging;
use crate::player::{PlaybackController, RodioOutput};

mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    if let Err(e) = logging::setup_logger(&settings.log) {
        eprintln!("encore: logging disabled: {e}");
    }

    let output = RodioOutput::open(
        settings.backend.base_url.clone(),
        Duration::from_millis(settings.audio.fetch_timeout_ms),
    )?;
    let (events_tx, events_rx) = mpsc::channel();
    let controller = PlaybackController::new(output, settings.audio.initial_volume, events_tx);

    let remote = settings.backend.base_url.is_some();
    let mut loader = Loader::spawn(startup::build_catalog(&settings)?);
    startup::request_initial(&mut loader, remote);

    let app = App::new(controller.session().volume());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState {
            app,
            controller,
            events: events_rx,
            loader,
            remote,
        };
        event_loop::run(&mut terminal, &settings, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("shutting down");
    run_result
}
