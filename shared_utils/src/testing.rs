//! Test doubles for workflow tests: a scripted command runner and a
//! scripted prompter. Enabled with the `testing` feature.

use crate::errors::{Result, RipError};
use crate::prompt::{MenuItem, Prompter};
use crate::runner::{CommandRunner, ToolCommand, ToolOutput, ToolStatus};
use std::cell::RefCell;
use std::collections::VecDeque;

type Effect = Box<dyn Fn(&ToolCommand)>;

struct Rule {
    program: String,
    contains: Vec<String>,
    output: ToolOutput,
    effect: Option<Effect>,
    once: bool,
}

impl Rule {
    fn matches(&self, cmd: &ToolCommand) -> bool {
        cmd.program == self.program && self.contains.iter().all(|c| cmd.has_arg(c))
    }
}

/// Replays canned tool output. One-shot rules are tried before standing
/// ones, each in insertion order; a command no rule matches succeeds with
/// empty output. Every call is recorded.
#[derive(Default)]
pub struct FakeRunner {
    rules: RefCell<Vec<Rule>>,
    calls: RefCell<Vec<ToolCommand>>,
    missing: RefCell<Vec<String>>,
}

pub fn ok(stdout: &str) -> ToolOutput {
    ToolOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn ok_stderr(stderr: &str) -> ToolOutput {
    ToolOutput {
        exit_code: Some(0),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

pub fn failed(code: i32, stderr: &str) -> ToolOutput {
    ToolOutput {
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Effect for [`FakeRunner::respond_with`] that writes a small file where the
/// tool would have written its output: the argument after `flag`, or the
/// last argument when `flag` is empty.
pub fn creates_output(flag: &'static str) -> impl Fn(&ToolCommand) {
    move |cmd: &ToolCommand| {
        let target = if flag.is_empty() {
            cmd.args.last().cloned()
        } else {
            cmd.arg_after(flag).map(str::to_string)
        };
        if let Some(target) = target {
            if let Err(e) = std::fs::write(&target, vec![1u8; 4096]) {
                panic!("fake output {} not written: {}", target, e);
            }
        }
    }
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, program: &str, contains: &[&str], output: ToolOutput, effect: Option<Effect>, once: bool) {
        self.rules.borrow_mut().push(Rule {
            program: program.to_string(),
            contains: contains.iter().map(|s| s.to_string()).collect(),
            output,
            effect,
            once,
        });
    }

    /// Answer every matching command with `output`.
    pub fn respond(&self, program: &str, contains: &[&str], output: ToolOutput) {
        self.push(program, contains, output, None, false);
    }

    /// Answer only the next matching command with `output`.
    pub fn respond_once(&self, program: &str, contains: &[&str], output: ToolOutput) {
        self.push(program, contains, output, None, true);
    }

    /// Answer with `output` after running `effect`, e.g. to create the file
    /// an encoder would have written.
    pub fn respond_with(
        &self,
        program: &str,
        contains: &[&str],
        output: ToolOutput,
        effect: impl Fn(&ToolCommand) + 'static,
    ) {
        self.push(program, contains, output, Some(Box::new(effect)), false);
    }

    /// One-shot variant of [`FakeRunner::respond_with`], e.g. an encoder that
    /// writes part of its output and then fails.
    pub fn respond_once_with(
        &self,
        program: &str,
        contains: &[&str],
        output: ToolOutput,
        effect: impl Fn(&ToolCommand) + 'static,
    ) {
        self.push(program, contains, output, Some(Box::new(effect)), true);
    }

    /// Make `program` behave as if it were not installed.
    pub fn missing(&self, program: &str) {
        self.missing.borrow_mut().push(program.to_string());
    }

    pub fn calls(&self) -> Vec<ToolCommand> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, program: &str) -> Vec<ToolCommand> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program == program)
            .cloned()
            .collect()
    }

    fn dispatch(&self, cmd: &ToolCommand) -> Result<ToolOutput> {
        self.calls.borrow_mut().push(cmd.clone());
        if self.missing.borrow().iter().any(|m| m == &cmd.program) {
            return Err(RipError::ToolNotFound(cmd.program.clone()));
        }

        let mut rules = self.rules.borrow_mut();
        let found = rules
            .iter()
            .position(|r| r.once && r.matches(cmd))
            .or_else(|| rules.iter().position(|r| r.matches(cmd)));
        let Some(idx) = found else {
            return Ok(ok(""));
        };
        let output = rules[idx].output.clone();
        let rule = if rules[idx].once {
            Some(rules.remove(idx))
        } else {
            None
        };
        let effect = match &rule {
            Some(r) => r.effect.as_deref(),
            None => rules[idx].effect.as_deref(),
        };
        if let Some(effect) = effect {
            effect(cmd);
        }
        Ok(output)
    }
}

impl CommandRunner for FakeRunner {
    fn capture(&self, cmd: &ToolCommand) -> Result<ToolOutput> {
        self.dispatch(cmd)
    }

    fn run_attached(&self, cmd: &ToolCommand) -> Result<ToolStatus> {
        let output = self.dispatch(cmd)?;
        Ok(ToolStatus {
            exit_code: output.exit_code,
        })
    }

    fn locate(&self, program: &str) -> Option<std::path::PathBuf> {
        if self.missing.borrow().iter().any(|m| m == program) {
            None
        } else {
            Some(std::path::Path::new("/usr/bin").join(program))
        }
    }
}

/// One scripted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    /// Text for an input prompt; empty accepts the default.
    Text(String),
    /// Zero-based menu index.
    Choose(usize),
    Enter,
}

pub fn text(s: &str) -> Answer {
    Answer::Text(s.to_string())
}

/// Plays back answers in order and keeps a transcript of what was asked.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<Answer>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.borrow().len()
    }

    fn next(&self, prompt: &str) -> Answer {
        self.asked.borrow_mut().push(prompt.trim().to_string());
        match self.answers.borrow_mut().pop_front() {
            Some(answer) => answer,
            None => panic!("no scripted answer left for prompt: {:?}", prompt.trim()),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str) -> Result<bool> {
        match self.next(question) {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            other => panic!("expected Yes/No for {:?}, script had {:?}", question.trim(), other),
        }
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        match self.next(prompt) {
            Answer::Text(s) if s.is_empty() => Ok(default.unwrap_or_default().to_string()),
            Answer::Text(s) => Ok(s),
            other => panic!("expected Text for {:?}, script had {:?}", prompt.trim(), other),
        }
    }

    fn select(&self, prompt: &str, items: &[MenuItem], _default: usize) -> Result<usize> {
        match self.next(prompt) {
            Answer::Choose(i) if i < items.len() => Ok(i),
            other => panic!(
                "expected Choose(<{}) for {:?}, script had {:?}",
                items.len(),
                prompt.trim(),
                other
            ),
        }
    }

    fn pause(&self, message: &str) -> Result<()> {
        match self.next(message) {
            Answer::Enter => Ok(()),
            other => panic!("expected Enter for {:?}, script had {:?}", message.trim(), other),
        }
    }
}
