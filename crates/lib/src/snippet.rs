//! Snippets: one block of commands or one block of expected output.
//!
//! A command snippet is emitted behind a banner that echoes its text as a
//! comment, so a log of the generated scripts shows which commands produced
//! the output that follows.

use serde::{Deserialize, Serialize};

use crate::consts::RULE_WIDTH;

/// What a snippet holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnippetKind {
  /// Commands to run.
  #[serde(rename = "command", alias = "userinput")]
  Command,
  /// Output the preceding command is expected to print.
  #[serde(rename = "expected", alias = "screen")]
  ExpectedOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
  pub kind: SnippetKind,
  pub text: String,
  /// Set once the text has been overwritten by a replace directive.
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub replaced: bool,
}

impl Snippet {
  pub fn command(text: impl Into<String>) -> Self {
    Self {
      kind: SnippetKind::Command,
      text: text.into(),
      replaced: false,
    }
  }

  pub fn expected(text: impl Into<String>) -> Self {
    Self {
      kind: SnippetKind::ExpectedOutput,
      text: text.into(),
      replaced: false,
    }
  }

  pub fn is_command(&self) -> bool {
    self.kind == SnippetKind::Command
  }

  /// Overwrite the text, marking the snippet as replaced.
  pub fn replace(&mut self, text: &str) {
    self.text = text.to_string();
    self.replaced = true;
  }

  /// Banner followed by the commands, with nothing after them.
  ///
  /// This is the fragment run by a check: its output must not be polluted
  /// by the exit status guard.
  pub fn fragment(&self, label: &str) -> String {
    let mut out = banner(label, &self.text);
    out.push_str(&self.text);
    out.push('\n');
    out
  }

  /// Banner, commands and a guard reporting a non-zero exit status.
  ///
  /// The guard only reports; a failing command never stops the script.
  pub fn emit(&self, label: &str) -> String {
    let mut out = self.fragment(label);
    out.push_str(&format!(
      "err=$?\nif [ $err -ne 0 ]; then\n    echo \"Error: {label} returned exit code $err\"\nfi\necho\n\n"
    ));
    out
  }
}

/// `#` followed by a line of `fill` characters.
pub fn rule(fill: char) -> String {
  let mut line = String::with_capacity(RULE_WIDTH + 1);
  line.push('#');
  line.extend(std::iter::repeat_n(fill, RULE_WIDTH));
  line
}

/// Turn text into commands echoing it as a shell comment, one `echo` per
/// line.
///
/// Lines are single-quoted so nothing is expanded; embedded single quotes
/// are closed, double-quoted and reopened.
pub fn commentify(text: &str) -> String {
  text
    .lines()
    .map(|line| format!("echo '# {}'\n", line.replace('\'', r#"'"'"'"#)))
    .collect()
}

/// Commands printing the snippet banner.
pub fn banner(label: &str, text: &str) -> String {
  let rule = rule('-');
  format!("echo '{rule}'\necho '# Snippet {label}'\necho '{rule}'\n{}echo '{rule}'\n", commentify(text))
}

/// What the banner prints, with every line trimmed as check output is.
pub fn banner_output(label: &str, text: &str) -> String {
  let rule = rule('-');
  let mut lines = vec![rule.clone(), format!("# Snippet {label}")];
  lines.push(rule.clone());
  lines.extend(text.lines().map(|line| format!("# {line}")));
  lines.push(rule);
  trim_lines(&lines.join("\n"))
}

/// Strip leading and trailing whitespace from every line, terminating each
/// with a newline.
pub fn trim_lines(text: &str) -> String {
  text
    .lines()
    .map(|line| format!("{}\n", line.trim_matches(|c: char| c.is_ascii_whitespace())))
    .collect()
}
