//! Event handling and console feedback

use console::{Style, Term};
use llvmpkg_events::{AppEvent, BuildEvent, DownloadEvent, GeneralEvent, PackageEvent};

/// Renders pipeline events on stderr and forwards them to tracing
pub struct EventHandler {
    term: Term,
    colors: bool,
    debug: bool,
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors: bool, debug: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors,
            debug,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        crate::logging::log_event_with_tracing(&event);
        if self.quiet {
            return;
        }
        if let Some(line) = self.render(&event) {
            self.term.write_line(&line).unwrap_or(());
        }
    }

    /// Console line for an event, if it is shown at the current verbosity
    fn render(&self, event: &AppEvent) -> Option<String> {
        let line = match event {
            AppEvent::Build(BuildEvent::StageStarted { stage, package }) => {
                format!("{} {stage} {package}", self.paint(&Style::new().cyan().bold(), "==>"))
            }
            AppEvent::Build(BuildEvent::StageCompleted {
                stage, duration, ..
            }) => format!(
                "{} {stage} finished in {:.1}s",
                self.paint(&Style::new().green(), "ok"),
                duration.as_secs_f64()
            ),
            AppEvent::Build(BuildEvent::StageFailed { stage, failure, .. }) => format!(
                "{} {stage} failed: {}",
                self.paint(&Style::new().red().bold(), "error"),
                failure.message
            ),
            AppEvent::Build(BuildEvent::ComponentStaged {
                component,
                version,
                destination,
            }) => format!(
                "    staged {component} {version} -> {}",
                destination.display()
            ),
            AppEvent::Build(BuildEvent::BuildDirReset { path }) => {
                format!("    removed stale build tree {}", path.display())
            }
            AppEvent::Build(BuildEvent::ToolInvoked {
                step,
                program,
                args,
            }) => {
                let command = format!("{program} {}", args.join(" "));
                if self.debug {
                    format!("    [{step}] {}", self.paint(&Style::new().dim(), &command))
                } else {
                    format!("    [{step}] {program}")
                }
            }
            AppEvent::Build(BuildEvent::ToolCompleted { step, duration }) => {
                format!("    [{step}] done in {:.1}s", duration.as_secs_f64())
            }
            AppEvent::Download(DownloadEvent::Started {
                url, total_bytes, ..
            }) => match total_bytes {
                Some(bytes) => format!("    downloading {url} ({})", human_bytes(*bytes)),
                None => format!("    downloading {url}"),
            },
            AppEvent::Download(DownloadEvent::Completed {
                bytes_downloaded, ..
            }) if self.debug => {
                format!("    downloaded {}", human_bytes(*bytes_downloaded))
            }
            AppEvent::Download(DownloadEvent::Failed { url, failure, .. }) => format!(
                "{} download of {url} failed: {}",
                self.paint(&Style::new().red(), "error"),
                failure.message
            ),
            AppEvent::Package(PackageEvent::RuleApplied {
                pattern,
                source,
                destination,
                files_copied,
            }) if self.debug => {
                format!("    {source}/{pattern} -> {destination}: {files_copied} files")
            }
            AppEvent::Package(PackageEvent::Completed {
                package_dir,
                files_copied,
            }) => format!(
                "    packaged {files_copied} files into {}",
                package_dir.display()
            ),
            AppEvent::General(GeneralEvent::Warning { message }) => {
                format!("{} {message}", self.paint(&Style::new().yellow(), "warning:"))
            }
            AppEvent::General(GeneralEvent::DebugLog { message }) if self.debug => {
                self.paint(&Style::new().dim(), &format!("    {message}"))
            }
            _ => return None,
        };
        Some(line)
    }

    fn paint(&self, style: &Style, text: &str) -> String {
        if self.colors {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
