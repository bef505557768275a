//! Typed terminal output commands and a single output gate.
//!
//! Invariant: the progress region is only written through `OutputGate::flush(..)`.

use crate::core::terminal::Terminal;

pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";
pub const CLEAR_LINE: &str = "\x1b[2K";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalCmd {
    /// Raw text (UTF-8, may contain SGR color codes).
    Bytes(String),

    /// Cursor visibility.
    HideCursor,
    ShowCursor,

    /// Move the cursor up `n` rows. `MoveUp(0)` emits nothing.
    MoveUp(usize),
    /// Erase the current line.
    ClearLine,
    /// Return to column one.
    CarriageReturn,
    Newline,
}

impl TerminalCmd {
    /// Append the escape encoding of this command to `out`.
    pub fn encode_into(&self, out: &mut String) {
        match self {
            TerminalCmd::Bytes(data) => out.push_str(data),
            TerminalCmd::HideCursor => out.push_str(HIDE_CURSOR),
            TerminalCmd::ShowCursor => out.push_str(SHOW_CURSOR),
            TerminalCmd::MoveUp(n) => {
                // `ESC[0A` moves one row on most terminals.
                if *n > 0 {
                    out.push_str(&format!("\x1b[{n}A"));
                }
            }
            TerminalCmd::ClearLine => out.push_str(CLEAR_LINE),
            TerminalCmd::CarriageReturn => out.push('\r'),
            TerminalCmd::Newline => out.push('\n'),
        }
    }
}

#[derive(Debug, Default)]
pub struct OutputGate {
    cmds: Vec<TerminalCmd>,
}

impl OutputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: TerminalCmd) {
        self.cmds.push(cmd);
    }

    pub fn extend<I>(&mut self, cmds: I)
    where
        I: IntoIterator<Item = TerminalCmd>,
    {
        self.cmds.extend(cmds);
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Encode all buffered commands without writing them.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for cmd in &self.cmds {
            cmd.encode_into(&mut out);
        }
        out
    }

    /// Flush buffered commands to the terminal as one write.
    ///
    /// A frame is written in a single call so a partially drawn region is never visible.
    pub fn flush<T: Terminal + ?Sized>(&mut self, term: &mut T) {
        if self.cmds.is_empty() {
            return;
        }
        let data = self.encode();
        self.cmds.clear();
        term.write(&data);
        term.flush();
    }
}
