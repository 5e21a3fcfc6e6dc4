use std::io::Write;

use webshell_core::{HostView, Notice, NoticeDuration, SessionState, ShellViewModel};
use webshell_logging::shell_trace;

const BAR_WIDTH: usize = 20;

/// Terminal stand-in for the host's progress widget and toast sink.
pub(crate) struct ConsoleView<W: Write> {
    out: W,
}

impl<W: Write> ConsoleView<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    pub(crate) fn print_status(&mut self, view: &ShellViewModel) {
        let _ = writeln!(self.out, "{}", render_status(view));
        let _ = self.out.flush();
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> HostView for ConsoleView<W> {
    fn set_indicator_visible(&mut self, visible: bool) {
        shell_trace!("indicator visible={}", visible);
    }

    fn set_indicator_progress(&mut self, percent: u8) {
        shell_trace!("indicator progress={}", percent);
    }

    fn notify(&mut self, notice: Notice) {
        let tag = match notice.duration {
            NoticeDuration::Short => "!",
            NoticeDuration::Long => "!!",
        };
        let _ = writeln!(self.out, "[{}] {}", tag, notice.text);
        let _ = self.out.flush();
    }
}

pub(crate) fn render_status(view: &ShellViewModel) -> String {
    let state = match view.state {
        SessionState::Idle => "Idle",
        SessionState::Loading => "Loading",
        SessionState::Loaded => "Loaded",
        SessionState::TimedOut => "Timed out (press back to retry)",
        SessionState::Errored => "Error",
    };
    let target = view.target_url.as_deref().unwrap_or("-");

    if view.indicator_visible {
        format!(
            "{} {} {:>3}% {}",
            state,
            progress_bar(view.progress),
            view.progress,
            target
        )
    } else {
        format!("{} {}", state, target)
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
