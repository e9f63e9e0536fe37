// SPDX-License-Identifier: MIT

//! Conditions raised by library code and the decision channel back.
//!
//! A backend that hits something it cannot resolve unilaterally builds a
//! [`Condition`] and hands it to the registered [`ConditionHandler`]. The
//! handler answers with one of the offered choices, or reports the request
//! unhandled, which the raising operation must treat as an abort.

use core::fmt;
use std::cell::RefCell;
use std::rc::Rc;

bitflags::bitflags! {
    /// Set of choices a condition offers, iterated in declaration order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Choices: u32 {
        const YES    = 1 << 0;
        const NO     = 1 << 1;
        const OK     = 1 << 2;
        const RETRY  = 1 << 3;
        const IGNORE = 1 << 4;
        const CANCEL = 1 << 5;
    }
}

/// A single choice picked out of a [`Choices`] set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
    Ok,
    Retry,
    Ignore,
    Cancel,
}

impl Choice {
    pub fn label(&self) -> &'static str {
        match self {
            Choice::Yes => "Yes",
            Choice::No => "No",
            Choice::Ok => "OK",
            Choice::Retry => "Retry",
            Choice::Ignore => "Ignore",
            Choice::Cancel => "Cancel",
        }
    }

    fn from_flag(flag: Choices) -> Option<Choice> {
        [
            (Choices::YES, Choice::Yes),
            (Choices::NO, Choice::No),
            (Choices::OK, Choice::Ok),
            (Choices::RETRY, Choice::Retry),
            (Choices::IGNORE, Choice::Ignore),
            (Choices::CANCEL, Choice::Cancel),
        ]
        .into_iter()
        .find_map(|(f, c)| (f == flag).then_some(c))
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Choices {
    /// Choices present in the set, in declaration order.
    pub fn iter_choices(&self) -> impl Iterator<Item = Choice> + '_ {
        self.iter().filter_map(Choice::from_flag)
    }

    /// The only choice in the set, if there is exactly one.
    pub fn single(&self) -> Option<Choice> {
        let mut it = self.iter_choices();
        match (it.next(), it.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Information,
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Information => "Information",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One condition surfaced to the handler. Lives only for the callback.
#[derive(Debug, Clone)]
pub struct Condition {
    pub severity: Severity,
    pub options: Choices,
    pub message: String,
}

impl Condition {
    pub fn new(severity: Severity, options: Choices, message: impl Into<String>) -> Self {
        Self {
            severity,
            options,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Chosen(Choice),
    /// The handler could not pick a choice; the raising operation aborts.
    Unhandled,
}

/// Synchronous decision callback. Must not be re-entered concurrently;
/// the whole pipeline is single-threaded and the handler is invoked from
/// inside library calls.
pub trait ConditionHandler {
    fn handle(&mut self, cond: &Condition) -> Resolution;
}

/// Registration handle shared between the orchestrator and the libraries.
pub type SharedHandler = Rc<RefCell<dyn ConditionHandler>>;

/// Raises `cond` through `handler`, or reports it unhandled when no
/// handler is registered.
pub fn raise(handler: Option<&SharedHandler>, cond: &Condition) -> Resolution {
    match handler {
        Some(h) => h.borrow_mut().handle(cond),
        None => Resolution::Unhandled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_iterate_in_declaration_order() {
        let set = Choices::CANCEL | Choices::IGNORE | Choices::YES;
        let order: Vec<Choice> = set.iter_choices().collect();
        assert_eq!(order, vec![Choice::Yes, Choice::Ignore, Choice::Cancel]);
    }

    #[test]
    fn single_choice() {
        assert_eq!(Choices::OK.single(), Some(Choice::Ok));
        assert_eq!((Choices::IGNORE | Choices::CANCEL).single(), None);
        assert_eq!(Choices::empty().single(), None);
    }

    #[test]
    fn raise_without_handler_is_unhandled() {
        let cond = Condition::new(Severity::Warning, Choices::OK, "anything");
        assert_eq!(raise(None, &cond), Resolution::Unhandled);
    }
}
