mod app;
mod backend;
mod config;
mod library;
mod logging;
mod player;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
