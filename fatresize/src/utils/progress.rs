use std::io::Write;

use fatresize_fs::Progress;
use indicatif::{ProgressBar, ProgressStyle};

/// Renders engine progress reports.
///
/// Below verbosity 3 a dot per report is all the noise we make; at 3 and
/// above a bar with the predicted time left is drawn, redrawn at most
/// once per distinct timer tick.
pub struct ResizeProgress {
    verbosity: i32,
    bar: Option<ProgressBar>,
    last_update: u64,
    time_left: u64,
    dotted: bool,
}

impl ResizeProgress {
    pub fn new(verbosity: i32) -> Self {
        let bar = (verbosity >= 3).then(|| {
            let pb = ProgressBar::new(100);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{prefix}... [{bar:40.white}] {pos}% (time left {msg})")
                    .unwrap()
                    .progress_chars("█░░"),
            );
            pb
        });
        Self {
            verbosity,
            bar,
            last_update: 0,
            time_left: 0,
            dotted: false,
        }
    }

    pub fn tick(&mut self, progress: &Progress) {
        if self.verbosity == -1 {
            return;
        }
        let Some(bar) = &self.bar else {
            print!(".");
            let _ = std::io::stdout().flush();
            self.dotted = true;
            return;
        };

        // One redraw per distinct tick; no tick has passed, no redraw.
        if progress.now == self.last_update || progress.now <= progress.start {
            return;
        }
        self.time_left = progress.predicted_end.saturating_sub(progress.now);
        self.last_update = progress.now;

        bar.set_prefix(progress.state_name.unwrap_or("resizing").to_string());
        bar.set_position((progress.frac * 100.0) as u64);
        bar.set_message(format!(
            "{:02}:{:02}",
            self.time_left / 60,
            self.time_left % 60
        ));
    }

    pub fn finish(&mut self) {
        if let Some(bar) = &self.bar {
            bar.finish();
        } else if self.dotted {
            println!();
        }
    }
}
