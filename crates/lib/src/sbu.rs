//! Build time accounting in SBUs.
//!
//! One SBU is the time the reference package takes to build on the machine
//! at hand. The generated scripts measure every package build, convert it to
//! SBUs and keep a running total in two small files of the state directory,
//! so progress can be compared with the book's estimates whatever the speed
//! of the machine, across interruptions and reboots.
//!
//! Arithmetic in generated code is done with `awk`, which every build host
//! has; `bc` is not available until the new system builds it.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::consts::{SBU_SECONDS_FILE, SBU_TOTAL_FILE};
use crate::directive::DirectiveTable;
use crate::section::{Archive, Section, SectionId};

#[derive(Debug, Error)]
pub enum SbuError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid value '{value}' in {path}")]
  Parse { path: PathBuf, value: String },

  #[error("failed to remove {path}: {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Documented SBUs of a package section, and the documented total once it
/// is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SbuExpectation {
  pub sbu: f64,
  pub running_total: f64,
}

/// Documented SBU values for every generated package section.
#[derive(Debug, Clone, PartialEq)]
pub struct SbuPlan {
  reference: SectionId,
  expected: HashMap<SectionId, SbuExpectation>,
  target: f64,
}

impl SbuPlan {
  /// Accumulate estimates in document order. Sections ignored as a whole
  /// are not built and do not count; a missing estimate counts as zero.
  pub fn new(sections: &[Section], directives: &DirectiveTable, reference: SectionId) -> Self {
    let mut expected = HashMap::new();
    let mut total = 0.0;

    for section in sections
      .iter()
      .filter(|s| s.builds_package && !directives.is_ignored(&s.id))
    {
      let sbu = section.estimate.sbu.unwrap_or(0.0);
      total += sbu;
      expected.insert(
        section.id,
        SbuExpectation {
          sbu,
          running_total: total,
        },
      );
    }

    Self {
      reference,
      expected,
      target: total,
    }
  }

  pub fn expectation(&self, id: &SectionId) -> SbuExpectation {
    self.expected.get(id).copied().unwrap_or_default()
  }

  /// Documented total of the whole build.
  pub fn target(&self) -> f64 {
    self.target
  }

  pub fn reference(&self) -> SectionId {
    self.reference
  }

  pub fn is_reference(&self, id: &SectionId) -> bool {
    *id == self.reference
  }

  /// Whether the reference section is among the generated package sections.
  pub fn has_reference(&self) -> bool {
    self.expected.contains_key(&self.reference)
  }
}

/// Code extracting a package archive and starting the clock.
pub fn package_prologue(archive: &Archive, sources_dir: &str) -> String {
  format!(
    "date\n\
     # Extracting from package archive\n\
     echo '# Extracting from package archive'\n\
     cd {sources_dir}\n\
     tar xvf {filename} > /dev/null\n\
     cd {subdir}\n\
     start=$SECONDS\n",
    filename = archive.filename,
    subdir = archive.subdir,
  )
}

/// Everything the code closing a package section depends on.
#[derive(Debug, Clone)]
pub struct Epilogue<'a> {
  pub section: SectionId,
  pub archive: &'a Archive,
  pub expected: SbuExpectation,
  pub target: f64,
  pub is_reference: bool,
  /// State directory as seen by the script at run time.
  pub state_dir: &'a str,
  pub sources_dir: &'a str,
}

impl Epilogue<'_> {
  /// Code stopping the clock, accounting the build, printing progress and
  /// removing the build directory.
  pub fn render(&self) -> String {
    let id = self.section;
    let state = self.state_dir;
    let mut out = format!("# Finish section {id}\nend=$SECONDS\nduration=$(( end - start ))\n");

    if self.is_reference {
      out.push_str(&format!(
        "\n# Define and persist the SBU value in seconds\n\
         if [ $duration -lt 1 ]; then\n    duration=1\nfi\n\
         sbu_in_secs=$duration\n\
         echo $sbu_in_secs > {state}/{SBU_SECONDS_FILE}\n\
         sbu=1.0\n\
         sbu_total=1.0\n\
         echo $sbu_total > {state}/{SBU_TOTAL_FILE}\n"
      ));
    } else {
      out.push_str(&format!(
        "\nif [ -n \"$sbu_in_secs\" ]; then\n    \
         sbu=$(awk -v d=$duration -v s=$sbu_in_secs 'BEGIN {{ printf \"%.1f\", d / s }}')\n\
         else\n    \
         echo \"{id}: SBU not measured yet, counting 0.0\"\n    \
         sbu=0.0\n\
         fi\n\
         sbu_total=$(awk -v t=${{sbu_total:-0}} -v s=$sbu 'BEGIN {{ printf \"%.1f\", t + s }}')\n\
         echo $sbu_total > {state}/{SBU_TOTAL_FILE}\n"
      ));
    }

    out.push_str(&format!(
      "\nelapsed_txt=$(elapsed $duration)\n\
       printf \"{id}: %s = %03.1f SBUs (expected %03.1f), total: %03.1f (expected %03.1f), target %03.1f\\n\" \
       $elapsed_txt $sbu {sbu:.1} $sbu_total {running:.1} {target:.1}\n\
       cd {sources}\n\
       rm -rf {subdir}\n\n",
      sbu = self.expected.sbu,
      running = self.expected.running_total,
      target = self.target,
      sources = self.sources_dir,
      subdir = self.archive.subdir,
    ));

    out
  }
}

/// The accounting state persisted by generated scripts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SbuLedger {
  /// Seconds in one SBU, once the reference package has been built.
  pub seconds_per_sbu: Option<u64>,
  /// SBUs measured so far.
  pub total: Option<f64>,
}

fn round1(x: f64) -> f64 {
  (x * 10.0).round() / 10.0
}

fn read_value(path: &Path) -> Result<Option<String>, SbuError> {
  match fs::read_to_string(path) {
    Ok(content) => Ok(Some(content.trim().to_string())),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
    Err(source) => Err(SbuError::Read {
      path: path.to_path_buf(),
      source,
    }),
  }
}

impl SbuLedger {
  /// Read the ledger files of a state directory. Missing files are an
  /// empty ledger: nothing has been measured yet.
  pub fn load(state_dir: &Path) -> Result<Self, SbuError> {
    let secs_path = state_dir.join(SBU_SECONDS_FILE);
    let total_path = state_dir.join(SBU_TOTAL_FILE);

    let seconds_per_sbu = read_value(&secs_path)?
      .map(|v| {
        v.parse::<u64>().map_err(|_| SbuError::Parse {
          path: secs_path.clone(),
          value: v,
        })
      })
      .transpose()?;
    let total = read_value(&total_path)?
      .map(|v| {
        v.parse::<f64>().map_err(|_| SbuError::Parse {
          path: total_path.clone(),
          value: v,
        })
      })
      .transpose()?;

    Ok(Self { seconds_per_sbu, total })
  }

  /// Remove the ledger files, so the next run measures from scratch.
  /// Returns the files actually removed.
  pub fn reset(state_dir: &Path) -> Result<Vec<PathBuf>, SbuError> {
    let mut removed = Vec::new();
    for name in [SBU_SECONDS_FILE, SBU_TOTAL_FILE] {
      let path = state_dir.join(name);
      match fs::remove_file(&path) {
        Ok(()) => removed.push(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(source) => return Err(SbuError::Remove { path, source }),
      }
    }
    Ok(removed)
  }

  /// Account the reference build: it defines the SBU and counts as 1.0.
  pub fn record_reference(&mut self, duration_secs: u64) -> f64 {
    self.seconds_per_sbu = Some(duration_secs.max(1));
    self.total = Some(1.0);
    1.0
  }

  /// Account a package build and return its SBUs, rounded to one decimal.
  /// Before the reference build it counts as zero.
  pub fn record(&mut self, duration_secs: u64) -> f64 {
    let sbu = match self.seconds_per_sbu {
      Some(secs) => round1(duration_secs as f64 / secs as f64),
      None => 0.0,
    };
    self.total = Some(round1(self.total.unwrap_or(0.0) + sbu));
    sbu
  }
}
