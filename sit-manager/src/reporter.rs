use sit_lib::game::installer::ProgressReporter;
use std::io::Write;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const MIN_INTERVAL: Duration = Duration::from_millis(150);

/// Progress reporter that prints to the terminal.
///
/// Percent updates are throttled and rendered on a single rewritten line;
/// everything else goes out as its own line.
pub struct ConsoleReporter {
    last_emit: Mutex<Instant>,
    last_percent: AtomicI32,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            last_emit: Mutex::new(Instant::now()),
            last_percent: AtomicI32::new(-1),
        }
    }

    fn line(&self, text: &str) {
        if self.last_percent.swap(-1, Ordering::Relaxed) >= 0 {
            println!();
        }
        println!("{}", text);
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleReporter {
    fn start_step(&self, name: &str, total_steps: Option<u32>) {
        match total_steps {
            Some(total) if total > 1 => self.line(&format!("==> {} ({} steps)", name, total)),
            _ => self.line(&format!("==> {}", name)),
        }
    }

    fn update_bytes(&self, _transferred: u64, _total: Option<u64>) {}

    fn set_percent(&self, percent: i32) {
        let prev = self.last_percent.load(Ordering::Relaxed);
        if percent == prev {
            return;
        }
        let mut allow = percent == 0 || percent == 100;
        if !allow {
            if let Ok(mut guard) = self.last_emit.lock() {
                if guard.elapsed() >= MIN_INTERVAL {
                    *guard = Instant::now();
                    allow = true;
                }
            }
        }
        if allow {
            self.last_percent.store(percent, Ordering::Relaxed);
            print!("\r    {:>3}%", percent);
            let _ = std::io::stdout().flush();
        }
    }

    fn set_message(&self, message: &str) {
        self.line(&format!("    {}", message));
    }

    fn set_step_count(&self, current: u32, total: Option<u32>) {
        match total {
            Some(total) => self.line(&format!("    step {}/{}", current, total)),
            None => self.line(&format!("    step {}", current)),
        }
    }

    fn set_substep(&self, name: Option<&str>, current: Option<u32>, total: Option<u32>) {
        // Per-file extraction lines are too noisy for a terminal.
        if let (Some(name), Some(current), Some(total)) = (name, current, total) {
            log::debug!("Extracting file {} ({}/{})", name, current, total);
        }
    }

    fn done(&self, success: bool, message: Option<&str>) {
        match (success, message) {
            (true, Some(message)) => self.line(message),
            (true, None) => self.line("Done."),
            (false, Some(message)) => self.line(&format!("Failed: {}", message)),
            (false, None) => self.line("Cancelled."),
        }
    }
}
