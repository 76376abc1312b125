//! Terminal painter for the panel

use std::sync::Mutex;

use colored::Colorize;

use crate::panel::{MessageBox, PanelSnapshot, PanelView};
use crate::render::paint_terminal;

/// Prints the status list whenever it changes, and every newly shown message
#[derive(Default)]
pub struct TerminalView {
    last: Mutex<Painted>,
}

#[derive(Default)]
struct Painted {
    steps: String,
    message_seq: u64,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PanelView for TerminalView {
    fn paint(&self, snapshot: &PanelSnapshot) {
        let Ok(mut last) = self.last.lock() else {
            return;
        };

        let steps = paint_terminal(&snapshot.steps);
        if !steps.is_empty() && steps != last.steps {
            eprintln!("{}\n", steps);
            last.steps = steps;
        }

        if let Some(message) = fresh_message(&snapshot.message, last.message_seq) {
            eprintln!("{}\n{}\n", message.title.bold(), message.body);
            last.message_seq = message.seq;
        }
    }
}

/// The message box, if it is visible and was shown after `printed_seq`
fn fresh_message(message: &MessageBox, printed_seq: u64) -> Option<&MessageBox> {
    (message.visible && message.seq > printed_seq).then_some(message)
}
