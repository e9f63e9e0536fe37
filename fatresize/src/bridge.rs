// SPDX-License-Identifier: MIT

//! The interactive decision bridge.
//!
//! Library code raises conditions mid-operation; this handler resolves
//! them either by policy (`--force-yes`) or by asking the operator on the
//! spot. It is the one place where library callbacks meet the terminal.

use std::cell::RefCell;
use std::io::{BufRead, BufReader, IsTerminal, Write};
use std::rc::Rc;

use colored::Colorize;
use fatresize_part::{
    Choice, Choices, Condition, ConditionHandler, Resolution, Severity, SharedHandler,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeMode {
    /// Resolve without asking: the `--force-yes` policy.
    Automatic,
    Interactive,
}

pub struct Bridge {
    mode: BridgeMode,
    verbosity: i32,
    input: Box<dyn BufRead>,
}

impl Bridge {
    pub fn new(mode: BridgeMode, verbosity: i32) -> Self {
        Self::with_input(mode, verbosity, BufReader::new(std::io::stdin()))
    }

    /// Bridge reading operator answers from `input` instead of stdin.
    pub fn with_input(mode: BridgeMode, verbosity: i32, input: impl BufRead + 'static) -> Self {
        Self {
            mode,
            verbosity,
            input: Box::new(input),
        }
    }

    pub fn shared(self) -> SharedHandler {
        Rc::new(RefCell::new(self))
    }

    fn auto_resolve(&self, cond: &Condition) -> Resolution {
        if cond.options == Choices::IGNORE | Choices::CANCEL {
            return Resolution::Chosen(Choice::Ignore);
        }
        // Only one choice? Take it.
        match cond.options.single() {
            Some(choice) => Resolution::Chosen(choice),
            None => Resolution::Unhandled,
        }
    }

    fn ask(&mut self, cond: &Condition) -> Resolution {
        loop {
            let labels: Vec<&str> = cond.options.iter_choices().map(|c| c.label()).collect();
            print!("\n{}: ", labels.join("/"));
            let _ = std::io::stdout().flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return Resolution::Chosen(Choice::Cancel),
                Ok(_) => {}
            }
            let answer = line.trim();
            for choice in cond.options.iter_choices() {
                if answer.eq_ignore_ascii_case(choice.label()) {
                    return Resolution::Chosen(choice);
                }
            }
        }
    }

    fn tag(severity: Severity) -> String {
        match severity {
            Severity::Information => severity.label().to_string(),
            Severity::Warning => severity.label().yellow().to_string(),
            Severity::Error => severity.label().red().to_string(),
        }
    }
}

impl ConditionHandler for Bridge {
    fn handle(&mut self, cond: &Condition) -> Resolution {
        match cond.severity {
            Severity::Information | Severity::Warning => {
                let line = format!("{}: {}", Self::tag(cond.severity), cond.message);
                if self.mode == BridgeMode::Automatic {
                    eprintln!("{line}");
                    self.auto_resolve(cond)
                } else {
                    println!("{line}");
                    self.ask(cond)
                }
            }
            // Never prompt on errors; report and abort the operation.
            Severity::Error => {
                if self.verbosity != -1 || std::io::stdin().is_terminal() {
                    eprintln!("{}: {}", Self::tag(cond.severity), cond.message);
                }
                Resolution::Chosen(Choice::Cancel)
            }
        }
    }
}
