use std::process::{Child, Command, Stdio};

use log::debug;

/// Fire-and-forget text to speech. Failures are never surfaced.
pub trait Speaker {
    fn speak(&mut self, text: &str);
}

#[cfg(target_os = "macos")]
const DEFAULT_COMMAND: &[&str] = &["say", "-v", "Kyoko"];
#[cfg(not(target_os = "macos"))]
const DEFAULT_COMMAND: &[&str] = &["espeak-ng", "-v", "ja"];

/// Runs an external program with the text as its last argument.
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    children: Vec<Child>,
}

impl CommandSpeaker {
    /// `command_line` is split on whitespace; the first word is the program.
    /// Blank means the platform default.
    pub fn new(command_line: Option<&str>) -> Self {
        let words: Vec<String> = match command_line.map(str::trim) {
            Some(line) if !line.is_empty() => line.split_whitespace().map(String::from).collect(),
            _ => DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect(),
        };
        let mut words = words.into_iter();
        let program = words.next().unwrap_or_default();
        Self {
            program,
            args: words.collect(),
            children: Vec::new(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn reap(&mut self) {
        self.children.retain_mut(|child| !matches!(child.try_wait(), Ok(Some(_))));
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) {
        self.reap();
        if text.is_empty() {
            return;
        }
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => self.children.push(child),
            Err(e) => debug!("speech command {} failed: {e}", self.program),
        }
    }
}

pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&mut self, _text: &str) {}
}

/// Remembers what it was asked to say.
#[derive(Default)]
pub struct RecordingSpeaker {
    pub spoken: Vec<String>,
}

impl Speaker for RecordingSpeaker {
    fn speak(&mut self, text: &str) {
        self.spoken.push(text.to_string());
    }
}
