use std::path::{Path, PathBuf};

use crate::directive::ExecContext;

/// Code being accumulated for one destination script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
  pub code: String,
  pub dest: PathBuf,
  pub context: ExecContext,
}

impl Frame {
  pub fn new(dest: impl Into<PathBuf>, context: ExecContext) -> Self {
    Self {
      code: String::new(),
      dest: dest.into(),
      context,
    }
  }
}

/// The script being generated, and the scripts suspended beneath it.
///
/// Generated code always goes to the active frame. A push suspends it and
/// starts a new one; a pop hands back the active frame, finished, and
/// resumes the frame below.
#[derive(Debug)]
pub struct CodeStack {
  active: Frame,
  suspended: Vec<Frame>,
}

impl CodeStack {
  pub fn new(root: Frame) -> Self {
    Self {
      active: root,
      suspended: Vec::new(),
    }
  }

  pub fn push_str(&mut self, code: &str) {
    self.active.code.push_str(code);
  }

  pub fn active(&self) -> &Frame {
    &self.active
  }

  pub fn context(&self) -> ExecContext {
    self.active.context
  }

  /// Number of suspended frames.
  pub fn depth(&self) -> usize {
    self.suspended.len()
  }

  pub fn push(&mut self, frame: Frame) {
    let previous = std::mem::replace(&mut self.active, frame);
    self.suspended.push(previous);
  }

  /// Finish the active frame and resume the one below it. `None` when
  /// nothing is suspended; the stack is left unchanged.
  pub fn pop(&mut self) -> Option<Frame> {
    let resumed = self.suspended.pop()?;
    Some(std::mem::replace(&mut self.active, resumed))
  }

  /// The root frame, once every push has been popped. Otherwise, the
  /// destination of the innermost unmatched push.
  pub fn finish(self) -> Result<Frame, PathBuf> {
    if self.suspended.is_empty() {
      Ok(self.active)
    } else {
      Err(self.active.dest)
    }
  }

  pub fn dest(&self) -> &Path {
    &self.active.dest
  }
}
