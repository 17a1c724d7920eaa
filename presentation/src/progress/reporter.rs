//! Progress reporting for Boomerang runs

use crate::output::console::ConsoleFormatter;
use boomerang_application::BoomerangEventSink;
use boomerang_domain::{AgentRegistry, BoomerangEvent};
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports a run with a specialist progress bar and a reviewer spinner.
/// Every printable event is written above the bars.
pub struct ProgressReporter {
    registry: AgentRegistry,
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
    review_spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry,
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
            review_spinner: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn print(&self, line: String) {
        // Terminal went away under the bars
        if self.multi.println(&line).is_err() {
            println!("{}", line);
        }
    }

    fn start_specialists(&self) {
        let Ok(mut slot) = self.phase_bar.lock() else {
            return;
        };
        if slot.is_some() {
            return;
        }
        let total = self.registry.specialists().count();
        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix("Specialists");
        pb.set_message("Starting...");
        pb.enable_steady_tick(Duration::from_millis(120));
        *slot = Some(pb);
    }

    fn specialist_settled(&self, agent: &str, success: bool) {
        if let Ok(slot) = self.phase_bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            let status = if success {
                format!("{} {}", "v".green(), agent)
            } else {
                format!("{} {}", "x".red(), agent)
            };
            pb.set_message(status);
            pb.inc(1);
        }
    }

    fn finish_specialists(&self) {
        if let Ok(mut slot) = self.phase_bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_with_message(format!("{}", "Specialists complete!".green()));
        }
    }

    fn start_review(&self, agent: &str) {
        self.finish_specialists();
        if let Ok(mut slot) = self.review_spinner.lock() {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::spinner_style());
            pb.set_prefix(ConsoleFormatter::agent_label(agent, &self.registry).to_string());
            pb.set_message("challenging the panel...");
            pb.enable_steady_tick(Duration::from_millis(120));
            *slot = Some(pb);
        }
    }

    fn set_review_message(&self, message: &str) {
        if let Ok(slot) = self.review_spinner.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(message.to_string());
        }
    }

    fn finish_all(&self) {
        self.finish_specialists();
        if let Ok(mut slot) = self.review_spinner.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }
}

impl BoomerangEventSink for ProgressReporter {
    fn emit(&self, event: &BoomerangEvent) {
        match event {
            BoomerangEvent::AgentStart { .. } => self.start_specialists(),
            BoomerangEvent::AgentComplete { agent, .. } if self.registry.is_specialist(agent) => {
                self.specialist_settled(agent, true)
            }
            BoomerangEvent::AgentError { agent, .. } if self.registry.is_specialist(agent) => {
                self.specialist_settled(agent, false)
            }
            BoomerangEvent::AxiomStart { agent } => self.start_review(agent),
            BoomerangEvent::AxiomChallenge { .. } => self.set_review_message("collecting responses..."),
            BoomerangEvent::AxiomVerdict { .. } => self.set_review_message("ruling..."),
            event if event.is_terminal() => self.finish_all(),
            _ => {}
        }

        if let Some(line) = ConsoleFormatter::event_line(event, &self.registry) {
            self.print(line);
        }
    }
}

/// Plain line-per-event output (no bars), for logs and dumb terminals
pub struct SimpleProgress {
    registry: AgentRegistry,
}

impl SimpleProgress {
    pub fn new(registry: AgentRegistry) -> Self {
        Self { registry }
    }
}

impl BoomerangEventSink for SimpleProgress {
    fn emit(&self, event: &BoomerangEvent) {
        match event {
            BoomerangEvent::AgentStart { agent } => {
                println!(
                    "{} {}",
                    "->".cyan(),
                    ConsoleFormatter::agent_label(agent, &self.registry)
                );
            }
            BoomerangEvent::Phase {
                phase,
                completed,
                total,
            } => {
                println!("  {} {}/{}", phase.bold(), completed, total);
            }
            event => {
                if let Some(line) = ConsoleFormatter::event_line(event, &self.registry) {
                    println!("{}", line);
                }
            }
        }
    }
}
