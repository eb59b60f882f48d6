//! Line-based terminal prompter

use std::cell::RefCell;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use colored::Colorize;

use subnet_publish_core::{validate_version, PublishError, Prompter, Result, Validator};

const MAX_ATTEMPTS: usize = 3;

pub struct TerminalPrompter<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl TerminalPrompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    fn ask(&self, prompt: &str) -> Result<String> {
        {
            let mut out = self.output.borrow_mut();
            write!(out, "{} ", format!("{}:", prompt).bold())?;
            out.flush()?;
        }

        let mut line = String::new();
        let read = self.input.borrow_mut().read_line(&mut line)?;
        if read == 0 {
            return Err(PublishError::MetadataCaptureFailed {
                message: "input closed".to_string(),
            });
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&self, message: &str) -> Result<()> {
        writeln!(self.output.borrow_mut(), "{}", message)?;
        Ok(())
    }

    /// Ask until `accept` passes, at most `MAX_ATTEMPTS` times
    fn ask_validated(&self, prompt: &str, accept: impl Fn(&str) -> Result<()>) -> Result<String> {
        let mut last_error = String::new();
        for _ in 0..MAX_ATTEMPTS {
            let answer = self.ask(prompt)?;
            match accept(&answer) {
                Ok(()) => return Ok(answer),
                Err(e) => {
                    last_error = e.to_string();
                    self.say(&format!("{} {}", "[WARN]".yellow(), last_error))?;
                }
            }
        }
        Err(PublishError::MetadataCaptureFailed {
            message: format!("no valid answer after {} attempts: {}", MAX_ATTEMPTS, last_error),
        })
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn capture_string(&self, prompt: &str) -> Result<String> {
        self.ask_validated(prompt, |answer| {
            if answer.trim().is_empty() {
                return Err(PublishError::MetadataCaptureFailed {
                    message: "a value is required".to_string(),
                });
            }
            Ok(())
        })
        .map(|s| s.trim().to_string())
    }

    fn capture_empty(&self, prompt: &str, validator: Validator<'_>) -> Result<String> {
        self.ask_validated(prompt, validator)
    }

    fn capture_list_decision(&self, prompt: &str, label: &str) -> Result<(Vec<String>, bool)> {
        self.say(prompt)?;
        let mut items: Vec<String> = Vec::new();

        loop {
            if !items.is_empty() {
                self.say(&format!("  {}: {}", label, items.join(", ").cyan()))?;
            }
            let hint = if items.is_empty() {
                "add / skip"
            } else {
                "add / del / done"
            };
            let choice = self.ask(&format!("[{}]", hint))?;

            match choice.trim() {
                "add" | "a" => {
                    let item = self.ask(&format!("  New {}", label))?;
                    let item = item.trim();
                    if item.is_empty() {
                        continue;
                    }
                    if items.iter().any(|i| i == item) {
                        self.say(&format!("{} {} already listed", "[WARN]".yellow(), item))?;
                    } else {
                        items.push(item.to_string());
                    }
                }
                "del" | "d" if !items.is_empty() => {
                    let item = self.ask(&format!("  {} to remove", label))?;
                    items.retain(|i| i != item.trim());
                }
                "skip" | "s" if items.is_empty() => return Ok((Vec::new(), true)),
                "done" | "" if !items.is_empty() => return Ok((items, false)),
                other => {
                    self.say(&format!("{} unknown choice '{}'", "[WARN]".yellow(), other))?;
                }
            }
        }
    }

    fn capture_version(&self, prompt: &str) -> Result<String> {
        self.ask_validated(prompt, validate_version)
            .map(|s| s.trim().to_string())
    }
}
