// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::HandoverError;
use std::fs;
use std::path::{Path, PathBuf};

/// One entry in the canonical `HANDOVER.md`, in the order it was merged.
#[derive(Debug, Clone)]
enum Entry {
    /// A single sequential-group stage (`copyStageToHandover`).
    Stage(String),
    /// A parallel group's stages, merged together (`mergeParallelOutputs`).
    Group(Vec<String>),
}

/// Owns the on-disk run directory (spec §3 Ownership, §4.C):
///
/// ```text
/// <run_dir>/
///     stages/<name>.md   # each stage's captured textual output
///     HANDOVER.md         # merged context, rebuilt on every copy/merge
/// ```
pub struct HandoverManager {
    run_dir: PathBuf,
    order: Vec<Entry>,
}

fn io_err(path: &Path, source: std::io::Error) -> HandoverError {
    HandoverError::Io {
        path: path.display().to_string(),
        source,
    }
}

impl HandoverManager {
    pub fn new(run_dir: impl Into<PathBuf>) -> Result<Self, HandoverError> {
        let run_dir = run_dir.into();
        let stages_dir = run_dir.join("stages");
        fs::create_dir_all(&stages_dir).map_err(|e| io_err(&stages_dir, e))?;
        Ok(Self {
            run_dir,
            order: Vec::new(),
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    fn stage_output_path(&self, name: &str) -> PathBuf {
        self.run_dir.join("stages").join(format!("{name}.md"))
    }

    fn handover_path(&self) -> PathBuf {
        self.run_dir.join("HANDOVER.md")
    }

    /// Persist a stage's raw textual output, prior to it being copied into
    /// the merged handover (called by the Stage Executor after a successful
    /// run, spec §4.F.6).
    pub fn write_stage_output(&self, name: &str, content: &str) -> Result<(), HandoverError> {
        let path = self.stage_output_path(name);
        fs::write(&path, content).map_err(|e| io_err(&path, e))
    }

    fn read_stage_output(&self, name: &str) -> Result<String, HandoverError> {
        let path = self.stage_output_path(name);
        fs::read_to_string(&path).map_err(|_| HandoverError::NoOutput(name.to_string()))
    }

    /// `copyStageToHandover(name)`: snapshot one sequential-group stage's
    /// output into `HANDOVER.md` (spec §4.C, §4.H.6, §8 invariant 6).
    /// Latest-writer-wins: calling this again for the same stage replaces
    /// its section in place rather than duplicating it.
    pub fn copy_stage_to_handover(&mut self, name: &str) -> Result<(), HandoverError> {
        // Validate the output exists before mutating order.
        self.read_stage_output(name)?;
        if let Some(pos) = self.order.iter().position(|e| matches!(e, Entry::Stage(n) if n == name))
        {
            self.order[pos] = Entry::Stage(name.to_string());
        } else {
            self.order.push(Entry::Stage(name.to_string()));
        }
        self.rebuild()
    }

    /// `mergeParallelOutputs([names])`: concatenate a parallel group's
    /// successful stage outputs with deterministic section headers, in the
    /// declaration order of `names` (spec §4.C, §4.G ordering guarantee).
    pub fn merge_parallel_outputs(&mut self, names: &[String]) -> Result<(), HandoverError> {
        for name in names {
            self.read_stage_output(name)?;
        }
        self.order.push(Entry::Group(names.to_vec()));
        self.rebuild()
    }

    /// `getPreviousStages()`: stage names with captured output, in the
    /// order their output files were written.
    pub fn get_previous_stages(&self) -> Result<Vec<String>, HandoverError> {
        let dir = self.run_dir.join("stages");
        let mut entries: Vec<(std::time::SystemTime, String)> = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| io_err(&dir, e))? {
            let entry = entry.map_err(|e| io_err(&dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                entries.push((modified, stem.to_string()));
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        Ok(entries.into_iter().map(|(_, name)| name).collect())
    }

    /// `buildContextMessage()`: a prompt-ready string the Stage Executor
    /// prepends to its prompt (spec §4.C, §4.F.1).
    pub fn build_context_message(&self) -> String {
        match fs::read_to_string(self.handover_path()) {
            Ok(content) if !content.trim().is_empty() => {
                format!("## Prior stage context\n\n{content}\n")
            }
            _ => String::new(),
        }
    }

    fn rebuild(&self) -> Result<(), HandoverError> {
        let mut out = String::new();
        for entry in &self.order {
            match entry {
                Entry::Stage(name) => {
                    let content = self.read_stage_output(name)?;
                    out.push_str(&format!("### Stage: {name}\n\n{content}\n\n"));
                }
                Entry::Group(names) => {
                    out.push_str("### Parallel group\n\n");
                    for name in names {
                        let content = self.read_stage_output(name)?;
                        out.push_str(&format!("#### Stage: {name}\n\n{content}\n\n"));
                    }
                }
            }
        }
        let path = self.handover_path();
        fs::write(&path, out).map_err(|e| io_err(&path, e))
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
