use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use webshell_core::{BackPressDecision, Bundle, LoadController, MonotonicClock, ShellMsg};
use webshell_engine::{HttpSurface, SurfaceEvents};
use webshell_logging::{set_dispatch_seq, shell_info};

use super::config::{ShellConfig, DEFAULT_CONFIG_PATH};
use super::console::ConsoleView;
use super::input::{poll_command, spawn_stdin_reader, UserCommand, HELP};
use super::logging;
use super::persistence::BundleFile;

type ShellController = LoadController<HttpSurface, ConsoleView<Stdout>, MonotonicClock>;

/// Pause between passes over the event queue.
const TICK: Duration = Duration::from_millis(20);

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = match ShellConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("warning: {err:#}; using default configuration");
            ShellConfig::default()
        }
    };
    logging::initialize(config.log_destination, config.log_level());
    shell_info!(
        "webshell starting target={} timeout_ms={}",
        config.target_url,
        config.timeout_ms
    );

    let bundle_file = BundleFile::new(&config.state_path);
    let saved = bundle_file.load();
    let mut shell = Shell::create(&config, saved.as_ref());
    println!("{HELP}");

    let commands = spawn_stdin_reader();

    let mut finished = false;
    loop {
        let mut exit = shell.pump();
        finished |= exit;

        while !exit {
            let Some(command) = poll_command(&commands) else {
                break;
            };
            match command {
                UserCommand::Back => shell.enqueue(ShellMsg::BackPressed),
                UserCommand::Open(url) => shell.enqueue(ShellMsg::NavigationRequested { url }),
                UserCommand::Pause => shell.enqueue(ShellMsg::Pause),
                UserCommand::Resume => shell.enqueue(ShellMsg::Resume),
                UserCommand::Reload => {
                    let url = shell.controller.config().target_url.clone();
                    shell.controller.start_session(&url);
                }
                UserCommand::Status => shell.print_status(),
                UserCommand::Save => shell.save_to(&bundle_file),
                UserCommand::Rotate => {
                    // Destroy and recreate the surface, carrying state in memory.
                    let mut bundle = Bundle::new();
                    shell.controller.save_state(&mut bundle);
                    shell.controller.teardown();
                    shell = Shell::create(&config, Some(&bundle));
                }
                UserCommand::Quit => {
                    shell.save_to(&bundle_file);
                    exit = true;
                }
            }
        }

        if exit {
            break;
        }
        thread::sleep(TICK);
    }

    shell.controller.teardown();
    if finished {
        bundle_file.clear();
    }
    shell_info!("webshell exiting");
    Ok(())
}

/// One surface plus the controller driving it, and the queue feeding both.
struct Shell {
    controller: ShellController,
    events: SurfaceEvents,
    queue: VecDeque<ShellMsg>,
    seq: u64,
}

impl Shell {
    fn create(config: &ShellConfig, saved: Option<&Bundle>) -> Self {
        let (surface, events) = HttpSurface::new(config.fetch_settings());
        let mut controller = LoadController::new(
            config.controller_config(),
            surface,
            ConsoleView::new(io::stdout()),
            MonotonicClock::new(),
        );
        controller.launch(saved);
        Self {
            controller,
            events,
            queue: VecDeque::new(),
            seq: 0,
        }
    }

    fn enqueue(&mut self, msg: ShellMsg) {
        self.queue.push_back(msg);
    }

    /// Drains everything queued so far, then checks the watchdog. Returns
    /// true when the host should exit.
    fn pump(&mut self) -> bool {
        while let Some(event) = self.events.try_recv() {
            self.queue.push_back(event.into());
        }

        let mut exit = false;
        while let Some(msg) = self.queue.pop_front() {
            self.seq += 1;
            set_dispatch_seq(self.seq);
            if self.controller.handle(msg) == Some(BackPressDecision::DelegateToHost) {
                exit = true;
            }
        }
        self.controller.poll_watchdog();

        if self.controller.consume_dirty() {
            self.print_status();
        }
        exit
    }

    fn save_to(&self, bundle_file: &BundleFile) {
        let mut bundle = Bundle::new();
        if self.controller.save_state(&mut bundle) {
            bundle_file.save(&bundle);
        }
    }

    fn print_status(&mut self) {
        let view = self.controller.view();
        self.controller.host_view_mut().print_status(&view);
    }
}
