//! Screen reconstruction from raw PTY output.
//!
//! `ScreenBuffer` is a cursor-addressable line buffer that consumes a
//! character stream containing ANSI escape sequences and control characters,
//! and produces the text a real terminal would have left on screen. It is a
//! "good enough to extract meaning" renderer: colors, attributes, the
//! alternate screen and scroll regions are not modelled.
//!
//! Writes overwrite in place rather than insert, so progress bars, spinners
//! and redraws collapse to their final state.

use std::collections::VecDeque;
use tracing::trace;

/// Default bound on retained rows.
pub const DEFAULT_MAX_LINES: usize = 1000;

/// How far past `ESC[` we look for the terminating letter of a CSI sequence.
const CSI_SCAN_WINDOW: usize = 20;

/// Upper bound for explicit column moves (CUF, CHA, CUP, tab stops).
const MAX_CURSOR_COL: usize = 10_000;

const TAB_WIDTH: usize = 8;

const ESC: char = '\x1b';
const BEL: char = '\x07';

/// A parsed CSI command: `<n>;<m><letter>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CsiCommand {
    n: usize,
    m: usize,
    letter: char,
}

/// Parse a CSI body against `^(\d*)(;(\d+))?([A-Za-z])$`.
///
/// Absent parameters default to 1; overflowing parameters saturate.
fn parse_csi(body: &[char]) -> Option<CsiCommand> {
    let (&letter, params) = body.split_last()?;
    if !letter.is_ascii_alphabetic() {
        return None;
    }

    let (first, second) = match params.iter().position(|&c| c == ';') {
        Some(idx) => (&params[..idx], Some(&params[idx + 1..])),
        None => (params, None),
    };

    if !first.iter().all(char::is_ascii_digit) {
        return None;
    }
    let n = if first.is_empty() { 1 } else { parse_param(first) };

    let m = match second {
        None => 1,
        Some(digits) => {
            // The second group is `\d+`: at least one digit, nothing else.
            if digits.is_empty() || !digits.iter().all(char::is_ascii_digit) {
                return None;
            }
            parse_param(digits)
        }
    };

    Some(CsiCommand { n, m, letter })
}

fn parse_param(digits: &[char]) -> usize {
    digits.iter().fold(0usize, |acc, c| {
        acc.saturating_mul(10)
            .saturating_add(c.to_digit(10).unwrap_or(0) as usize)
    })
}

/// Cursor-addressable line buffer.
///
/// Invariants, upheld after every public call:
/// - `lines` holds at least one row;
/// - `cursor_row < lines.len()`;
/// - `lines.len() <= max_lines`.
#[derive(Debug, Clone)]
pub struct ScreenBuffer {
    lines: VecDeque<Vec<char>>,
    cursor_row: usize,
    cursor_col: usize,
    max_lines: usize,
}

impl Default for ScreenBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenBuffer {
    /// Create an empty buffer retaining up to [`DEFAULT_MAX_LINES`] rows.
    pub fn new() -> Self {
        Self::with_max_lines(DEFAULT_MAX_LINES)
    }

    /// Create an empty buffer with a custom row bound (minimum 1).
    pub fn with_max_lines(max_lines: usize) -> Self {
        let mut lines = VecDeque::new();
        lines.push_back(Vec::new());
        Self {
            lines,
            cursor_row: 0,
            cursor_col: 0,
            max_lines: max_lines.max(1),
        }
    }

    /// Consume `input` and return the rendered screen.
    ///
    /// Can be called repeatedly; each call continues from the state the
    /// previous one left behind.
    pub fn process(&mut self, input: &str) -> String {
        self.feed(input);
        self.render()
    }

    /// Consume `input` without rendering.
    pub fn feed(&mut self, input: &str) {
        let chars: Vec<char> = input.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            i = match c {
                ESC => self.handle_escape(&chars, i),
                '[' => self.handle_bare_bracket(&chars, i),
                '\r' => {
                    self.cursor_col = 0;
                    i + 1
                }
                '\n' => {
                    self.line_feed();
                    i + 1
                }
                '\t' => {
                    let spaces = TAB_WIDTH - (self.cursor_col % TAB_WIDTH);
                    for _ in 0..spaces {
                        if self.cursor_col >= MAX_CURSOR_COL {
                            break;
                        }
                        self.write_char(' ');
                    }
                    i + 1
                }
                '\x08' => {
                    self.cursor_col = self.cursor_col.saturating_sub(1);
                    i + 1
                }
                c if (c as u32) < 32 => i + 1,
                c => {
                    self.write_char(c);
                    i + 1
                }
            };
        }
    }

    /// Render the current screen: rows trimmed on the right, joined with
    /// newlines, the whole trimmed.
    pub fn render(&self) -> String {
        let rows: Vec<String> = self
            .lines
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect();
        rows.join("\n").trim().to_string()
    }

    /// Return to a single empty row with the cursor at the origin.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.lines.push_back(Vec::new());
        self.cursor_row = 0;
        self.cursor_col = 0;
    }

    /// Current `(row, col)` cursor position.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    /// Number of retained rows.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Handle `ESC` at `start`; returns the index to resume scanning from.
    fn handle_escape(&mut self, chars: &[char], start: usize) -> usize {
        match chars.get(start + 1) {
            Some('[') => {
                let body_start = start + 2;
                let window_end = (body_start + CSI_SCAN_WINDOW).min(chars.len());
                let terminator = chars[body_start..window_end]
                    .iter()
                    .position(char::is_ascii_alphabetic);

                match terminator {
                    Some(offset) => {
                        let end = body_start + offset;
                        self.dispatch_body(&chars[body_start..=end]);
                        end + 1
                    }
                    None => {
                        trace!(target: "ptylens::screen", "Unterminated CSI sequence, skipping ESC[");
                        body_start
                    }
                }
            }
            Some(']') => match find_osc_end(chars, start + 2) {
                Some(resume) => resume,
                // Unterminated OSC: drop the ESC and let `]` print.
                None => start + 1,
            },
            _ => start + 1,
        }
    }

    /// Handle a `[` that was not preceded by `ESC`.
    ///
    /// Some programs emit CSI bodies without the escape prefix. Only a
    /// non-empty digit/semicolon run followed by a letter that parses as a
    /// CSI body is treated as a command; anything else is a literal `[`.
    fn handle_bare_bracket(&mut self, chars: &[char], start: usize) -> usize {
        let body_start = start + 1;
        let window_end = (body_start + CSI_SCAN_WINDOW).min(chars.len());
        let run = chars[body_start..window_end]
            .iter()
            .take_while(|c| c.is_ascii_digit() || **c == ';')
            .count();

        let letter_idx = body_start + run;
        let is_command = run > 0
            && letter_idx < window_end
            && chars[letter_idx].is_ascii_alphabetic();

        if is_command {
            if let Some(cmd) = parse_csi(&chars[body_start..=letter_idx]) {
                self.apply(cmd);
                return letter_idx + 1;
            }
        }

        self.write_char('[');
        start + 1
    }

    fn dispatch_body(&mut self, body: &[char]) {
        match parse_csi(body) {
            Some(cmd) => self.apply(cmd),
            None => trace!(
                target: "ptylens::screen",
                "Ignoring unsupported CSI body {:?}",
                body.iter().collect::<String>()
            ),
        }
    }

    fn apply(&mut self, cmd: CsiCommand) {
        let CsiCommand { n, m, letter } = cmd;
        match letter {
            'A' => self.cursor_row = self.cursor_row.saturating_sub(n),
            'B' => {
                self.cursor_row = self.cursor_row.saturating_add(n);
                self.ensure_cursor_row();
            }
            'C' => self.cursor_col = self.cursor_col.saturating_add(n).min(MAX_CURSOR_COL),
            'D' => self.cursor_col = self.cursor_col.saturating_sub(n),
            'H' | 'f' => {
                self.cursor_row = n.saturating_sub(1);
                self.cursor_col = m.saturating_sub(1).min(MAX_CURSOR_COL);
                self.ensure_cursor_row();
            }
            'J' => {
                if n == 2 {
                    self.reset();
                }
            }
            'K' => {
                let col = self.cursor_col;
                self.lines[self.cursor_row].truncate(col);
            }
            'G' => self.cursor_col = n.saturating_sub(1).min(MAX_CURSOR_COL),
            'E' => {
                self.cursor_row = self.cursor_row.saturating_add(n);
                self.ensure_cursor_row();
                self.cursor_col = 0;
            }
            'F' => {
                self.cursor_row = self.cursor_row.saturating_sub(n);
                self.cursor_col = 0;
            }
            // SGR and everything else carry no layout information.
            _ => {}
        }
    }

    /// LF starts the next row at column 0.
    fn line_feed(&mut self) {
        self.cursor_row += 1;
        self.cursor_col = 0;
        self.ensure_cursor_row();
    }

    /// Grow `lines` until `cursor_row` is a valid index, evicting the oldest
    /// rows beyond `max_lines` and shifting the cursor up to compensate.
    ///
    /// Equivalent to appending one row at a time and evicting as needed, but
    /// never allocates more than `max_lines` rows.
    fn ensure_cursor_row(&mut self) {
        if self.cursor_row < self.lines.len() {
            return;
        }

        let target_len = self.cursor_row.saturating_add(1);
        let overflow = target_len.saturating_sub(self.max_lines);
        let evict_existing = overflow.min(self.lines.len());
        self.lines.drain(..evict_existing);

        let new_len = target_len - overflow;
        while self.lines.len() < new_len {
            self.lines.push_back(Vec::new());
        }
        self.cursor_row -= overflow;

        if overflow > 0 {
            trace!(target: "ptylens::screen", "Evicted {} rows past max_lines={}", overflow, self.max_lines);
        }
    }

    fn write_char(&mut self, c: char) {
        let col = self.cursor_col;
        let row = &mut self.lines[self.cursor_row];
        if col < row.len() {
            row[col] = c;
        } else {
            row.resize(col, ' ');
            row.push(c);
        }
        self.cursor_col += 1;
    }
}

/// Find the end of an OSC sequence whose payload starts at `from`.
/// Returns the index just past the BEL or `ESC \` terminator.
fn find_osc_end(chars: &[char], from: usize) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        match chars[i] {
            BEL => return Some(i + 1),
            ESC if chars.get(i + 1) == Some(&'\\') => return Some(i + 2),
            // A new escape sequence before the terminator: the OSC was cut off.
            ESC => return None,
            _ => i += 1,
        }
    }
    None
}

/// Render `raw` on a fresh buffer.
pub fn render(raw: &str) -> String {
    ScreenBuffer::new().process(raw)
}
