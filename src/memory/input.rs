use std::collections::VecDeque;
use std::io::{self, BufRead};

/// The source of lines consumed by `READ`.
///
/// `Queued` holds lines already read eagerly from an `--input` file (spec
/// §6); `Interactive` reads standard input lazily, one line per call, when
/// no `--input` file was given. Both are drained line by line; once
/// exhausted, further reads yield `None`, which `READ` turns into `Nil`
/// regardless of the requested type (spec §4.7).
pub enum Input {
    Queued(VecDeque<String>),
    Interactive,
}

impl Input {
    pub fn from_lines<I: IntoIterator<Item = String>>(lines: I) -> Input {
        Input::Queued(lines.into_iter().collect())
    }

    pub fn interactive() -> Input {
        Input::Interactive
    }

    /// Pops the next line, or `None` if the queue/stream is exhausted.
    pub fn next_line(&mut self) -> Option<String> {
        match self {
            Input::Queued(lines) => lines.pop_front(),
            Input::Interactive => {
                let mut line = String::new();
                match io::stdin().lock().read_line(&mut line) {
                    Ok(0) | Err(_) => None,
                    Ok(_) => {
                        if line.ends_with('\n') {
                            line.pop();
                            if line.ends_with('\r') {
                                line.pop();
                            }
                        }
                        Some(line)
                    }
                }
            }
        }
    }
}
