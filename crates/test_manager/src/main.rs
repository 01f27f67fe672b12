use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use casebook::{init_logging, ComponentRc, EnvConfig, ProcessTerminal, TUI};
use test_manager::app::App;
use test_manager::runtime::RuntimeController;
use test_manager::tui::{lock_unpoisoned, AppComponent};

fn main() -> anyhow::Result<()> {
    let config = EnvConfig::from_env().context("invalid environment configuration")?;
    init_logging(&config).context("failed to initialise logging")?;

    let app = Arc::new(Mutex::new(App::new(config.notify_after)));
    let terminal = ProcessTerminal::new().with_write_log(config.write_log.clone());
    let mut tui = TUI::with_root(terminal, |render| {
        let host = RuntimeController::new(render);
        let root: ComponentRc = Rc::new(RefCell::new(Box::new(AppComponent::new(
            Arc::clone(&app),
            host,
        ))));
        root
    });
    tui.set_mouse_enabled(config.mouse);

    tui.start().context("failed to start the terminal")?;
    tracing::info!(mouse = config.mouse, "test manager started");

    while tui.is_running() && !lock_unpoisoned(&app).should_exit {
        tui.run_blocking_once();
    }

    tui.stop().context("failed to restore the terminal")
}
