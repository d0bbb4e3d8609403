use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use watchnotify::{
    actions::ConsoleNotifier, cli::Cli, config::NotifyConfig, session::Session, subst::SystemEnv,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    cli.setup_logging();

    let config = match &cli.config {
        Some(path) => NotifyConfig::load(path)?,
        None => NotifyConfig::default(),
    };
    if let Err(err) = config.validate() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    let roots = cli.workspace_roots();
    let mut session = Session::new(roots, config, Box::new(SystemEnv), Box::new(ConsoleNotifier));
    session.start()?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        if let Some(event) = session.poll(Duration::from_millis(100)) {
            session.handle(&event);
        }
    }

    tracing::info!("shutting down");
    Ok(())
}
