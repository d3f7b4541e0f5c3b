//! Script generation: merging each section's snippets with its directives
//! into the scripts of a build.
//!
//! Sections are generated one after the other, in document order, into a
//! [`GenContext`]. Snippets sit at integer positions and directives at
//! [`Position`]s, so both sequences merge into one:
//!
//! - directives before snippet `i` apply before it;
//! - a directive at exactly `i` replaces or ignores snippet `i`;
//! - directives past the last snippet apply after it.
//!
//! Push and pop redirect the code that follows into other scripts; the
//! root script, run first, is written last by [`GenContext::finish`].

mod check;
mod script;
mod stack;

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use check::{CheckFiles, Pending, PendingCommand, checked_code, write_check_files};
pub use script::{assemble, file_footer, file_header, root_prologue, section_header};
pub use stack::{CodeStack, Frame};

use crate::directive::{Directive, DirectiveCommand, ExecContext, Position, SectionDirectives};
use crate::layout::{Layout, write_script};
use crate::params::ParameterMap;
use crate::placeholder::{self, SubstitutionError};
use crate::sbu::{Epilogue, SbuPlan, package_prologue};
use crate::section::Section;
use crate::snippet::{Snippet, SnippetKind};

#[derive(Debug, Error)]
pub enum GenerateError {
  /// Directives that cannot be applied as written.
  #[error("section {section}, position {target}: {reason}")]
  Configuration {
    section: String,
    target: String,
    reason: String,
  },

  #[error(transparent)]
  Substitution(#[from] SubstitutionError),

  #[error("script {} was pushed but never popped", .dest.display())]
  UnmatchedPush { dest: PathBuf },

  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

fn configuration(section: &Section, target: Position, reason: impl Into<String>) -> GenerateError {
  GenerateError::Configuration {
    section: section.id.to_string(),
    target: target.to_string(),
    reason: reason.into(),
  }
}

/// What a generation pass produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
  /// Scripts written, in the order they were finalized.
  pub scripts: Vec<PathBuf>,
  pub checks: Vec<CheckFiles>,
  /// Sections generated.
  pub sections: Vec<String>,
  /// Sections ignored as a whole.
  pub ignored: Vec<String>,
  /// Non-fatal problems, also logged as they happen.
  pub warnings: Vec<String>,
}

/// State threaded through one generation pass.
pub struct GenContext<'a> {
  layout: &'a Layout,
  label: &'a str,
  plan: &'a SbuPlan,
  params: &'a ParameterMap,
  now: DateTime<Local>,
  stack: CodeStack,
  report: GenerationReport,
}

impl<'a> GenContext<'a> {
  pub fn new(layout: &'a Layout, label: &'a str, plan: &'a SbuPlan, params: &'a ParameterMap) -> Self {
    Self {
      layout,
      label,
      plan,
      params,
      now: Local::now(),
      stack: CodeStack::new(Frame::new(layout.root_script(), ExecContext::Host)),
      report: GenerationReport::default(),
    }
  }

  /// Use a fixed generation time in file headers.
  pub fn with_time(mut self, now: DateTime<Local>) -> Self {
    self.now = now;
    self
  }

  /// Record a non-fatal problem in the report.
  pub fn warning(&mut self, message: String) {
    self.report.warnings.push(message);
  }

  /// Generate one section with its directives, if any.
  pub fn section(&mut self, section: &Section, directives: Option<&SectionDirectives>) -> Result<(), GenerateError> {
    let patches: &[Directive] = match directives {
      Some(SectionDirectives::IgnoreSection) => {
        debug!(section = %section.id, "section ignored");
        self.report.ignored.push(section.id.to_string());
        return Ok(());
      }
      Some(SectionDirectives::Patches(list)) => list,
      None => &[],
    };

    debug!(section = %section.id, snippets = section.snippets.len(), directives = patches.len(), "generating section");
    self.stack.push_str(&section_header(section));

    let archive = if section.builds_package {
      match &section.archive {
        Some(archive) => {
          let sources = self.layout.sources_dir(self.stack.context());
          self.stack.push_str(&package_prologue(archive, sources));
          Some(archive)
        }
        None => {
          warn!(section = %section.id, name = %section.name, "no archive for package, extraction and accounting omitted");
          self.warning(format!(
            "{} {}: cannot determine package archive, extraction and accounting omitted",
            section.id, section.name
          ));
          None
        }
      }
    } else {
      None
    };

    let mut pending = Pending::default();
    let mut next = 0;

    for (i, original) in section.snippets.iter().enumerate() {
      let here = Position::at(i);

      while next < patches.len() && patches[next].at < here {
        self.flush(section, &mut pending);
        self.apply_between(section, &patches[next])?;
        next += 1;
      }

      let mut snippet = original.clone();
      if next < patches.len() && patches[next].at == here {
        let directive = &patches[next];
        next += 1;
        if next < patches.len() && patches[next].at == here {
          return Err(configuration(section, here, "more than one directive targets this snippet"));
        }

        match &directive.command {
          DirectiveCommand::Ignore => {
            debug!(section = %section.id, snippet = i, "snippet ignored");
            continue;
          }
          DirectiveCommand::Replace(text) => snippet.replace(text),
          DirectiveCommand::Unrecognized(name) => self.unrecognized(section, here, name),
          other => {
            return Err(configuration(
              section,
              here,
              format!("'{}' must target a position between snippets", other.name()),
            ));
          }
        }
      }

      self.snippet(section, i, snippet, &mut pending)?;
    }

    self.flush(section, &mut pending);

    for directive in &patches[next..] {
      if directive.at.is_exact() {
        self.beyond_last(section, directive)?;
      } else {
        self.apply_between(section, directive)?;
      }
    }

    if let Some(archive) = archive {
      let context = self.stack.context();
      let state_dir = self.layout.runtime_state_dir(context);
      let epilogue = Epilogue {
        section: section.id,
        archive,
        expected: self.plan.expectation(&section.id),
        target: self.plan.target(),
        is_reference: self.plan.is_reference(&section.id),
        state_dir: &state_dir,
        sources_dir: self.layout.sources_dir(context),
      };
      self.stack.push_str(&epilogue.render());
    }

    self.report.sections.push(section.id.to_string());
    Ok(())
  }

  /// Substitute the values registered at `at` into `text`.
  fn substitute(&mut self, section: &Section, at: Position, text: &str) -> Result<String, GenerateError> {
    match self.params.lookup(&section.id, at) {
      Some(values) => Ok(placeholder::substitute(text, values)?),
      None => {
        if placeholder::has_markers(text) {
          warn!(section = %section.id, position = %at, "placeholders without values left as is");
          self.warning(format!("{} at {at}: placeholders without values left as is", section.id));
        }
        Ok(text.to_string())
      }
    }
  }

  fn snippet(
    &mut self,
    section: &Section,
    index: usize,
    mut snippet: Snippet,
    pending: &mut Pending,
  ) -> Result<(), GenerateError> {
    snippet.text = self.substitute(section, Position::at(index), &snippet.text)?;

    match snippet.kind {
      SnippetKind::Command => pending.push(index, snippet),
      SnippetKind::ExpectedOutput => match pending.take_for_check() {
        Some((unchecked, last)) => {
          for command in unchecked {
            self.emit(section, &command);
          }
          self.check(section, &last, &snippet.text)?;
        }
        None => debug!(section = %section.id, snippet = index, "expected output without a command, skipped"),
      },
    }
    Ok(())
  }

  fn emit(&mut self, section: &Section, command: &PendingCommand) {
    let mut label = format!("{}_{:02}", section.id, command.index);
    if command.snippet.replaced {
      label.push_str(" [replace]");
    }
    self.stack.push_str(&command.snippet.emit(&label));
  }

  /// Emit buffered commands unchecked.
  fn flush(&mut self, section: &Section, pending: &mut Pending) {
    for command in pending.drain() {
      self.emit(section, &command);
    }
  }

  fn check(&mut self, section: &Section, command: &PendingCommand, expected: &str) -> Result<(), GenerateError> {
    let stem = format!("{}_{:02}", section.id, command.index);
    let mut label = stem.clone();
    if command.snippet.replaced {
      label.push_str(" [replace]");
    }

    let files =
      write_check_files(self.layout.state_dir(), &stem, &label, &command.snippet, expected).map_err(|source| {
        GenerateError::Write {
          path: self.layout.state_dir().join(format!("{stem}_expected.txt")),
          source,
        }
      })?;

    let runtime_dir = self.layout.runtime_state_dir(self.stack.context());
    self
      .stack
      .push_str(&checked_code(&stem, &label, &command.snippet, &runtime_dir));
    debug!(section = %section.id, check = %stem, "output check generated");
    self.report.checks.push(files);
    Ok(())
  }

  fn unrecognized(&mut self, section: &Section, at: Position, name: &str) {
    warn!(section = %section.id, position = %at, command = %name, "unknown directive command, skipped");
    self.warning(format!("{} at {at}: unknown directive command '{name}', skipped", section.id));
  }

  /// A directive at a snippet index the section does not have. Push, pop
  /// and add apply after the last snippet.
  fn beyond_last(&mut self, section: &Section, directive: &Directive) -> Result<(), GenerateError> {
    match &directive.command {
      DirectiveCommand::Replace(_) | DirectiveCommand::Ignore => {
        warn!(section = %section.id, position = %directive.at, "no snippet at this position, directive skipped");
        self.warning(format!(
          "{} at {}: no snippet to {}, directive skipped",
          section.id,
          directive.at,
          directive.command.name()
        ));
        Ok(())
      }
      _ => self.apply_between(section, directive),
    }
  }

  /// Apply a directive positioned between two snippets.
  fn apply_between(&mut self, section: &Section, directive: &Directive) -> Result<(), GenerateError> {
    let at = directive.at;

    match &directive.command {
      DirectiveCommand::Replace(_) | DirectiveCommand::Ignore => Err(configuration(
        section,
        at,
        format!("'{}' must target a snippet index", directive.command.name()),
      )),
      DirectiveCommand::Push { path, context } => {
        let path = self.substitute(section, at, path)?;
        let dest = self.layout.resolve(&path);
        let context = context.unwrap_or(self.stack.context());
        info!(section = %section.id, position = %at, dest = %dest.display(), %context, "pushing script");
        self.stack.push(Frame::new(dest, context));
        Ok(())
      }
      DirectiveCommand::Pop => match self.stack.pop() {
        Some(frame) => self.write_frame(frame, false),
        None => Err(configuration(section, at, "pop without a pushed script")),
      },
      DirectiveCommand::Add(text) => {
        let text = self.substitute(section, at, text)?;
        let label = format!("{}_{at} [add]", section.id);
        self.stack.push_str(&Snippet::command(text).emit(&label));
        Ok(())
      }
      DirectiveCommand::Unrecognized(name) => {
        self.unrecognized(section, at, name);
        Ok(())
      }
    }
  }

  fn write_frame(&mut self, frame: Frame, root: bool) -> Result<(), GenerateError> {
    let state_dir = self.layout.runtime_state_dir(frame.context);
    let header = file_header(&frame.dest, self.label, &state_dir, self.now);
    let prologue = root.then(|| root_prologue(&state_dir));
    let content = assemble(prologue.as_deref(), &header, &frame.code, &file_footer(&frame.dest));

    write_script(&frame.dest, &content).map_err(|source| GenerateError::Write {
      path: frame.dest.clone(),
      source,
    })?;
    info!(path = %frame.dest.display(), "wrote script");
    self.report.scripts.push(frame.dest);
    Ok(())
  }

  /// Write the root script and return the report.
  ///
  /// # Errors
  ///
  /// [`GenerateError::UnmatchedPush`] when a pushed script was never popped;
  /// the root script is not written then.
  pub fn finish(mut self) -> Result<GenerationReport, GenerateError> {
    let stack = std::mem::replace(
      &mut self.stack,
      CodeStack::new(Frame::new(PathBuf::new(), ExecContext::Host)),
    );
    let root = stack
      .finish()
      .map_err(|dest| GenerateError::UnmatchedPush { dest })?;
    self.write_frame(root, true)?;
    Ok(self.report)
  }

  /// Code accumulated so far in the active script.
  pub fn pending_code(&self) -> &str {
    &self.stack.active().code
  }
}
