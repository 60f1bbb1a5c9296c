//! Tracked fixture files and their guaranteed restoration.
//!
//! Autofixing tools rewrite fixtures in place. [`FixtureGuard`] snapshots the
//! original bytes up front and writes them back either through
//! [`FixtureGuard::restore`] or, on early return and unwinding, from `Drop`.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ExecutionError;

/// Suffix of the sibling file holding first-pass fixed content.
pub const FIXED_SUFFIX: &str = "_fixed";

/// One tracked input file.
#[derive(Debug, Clone)]
pub struct Fixture {
    /// Path as the tool sees it from the case directory (`./sub/file.m`)
    pub display: String,
    path: PathBuf,
    original: Vec<u8>,
    /// Bytes after the first fix pass; `None` if the pass removed the file
    pass_one: Option<Vec<u8>>,
}

impl Fixture {
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// Current bytes on disk, `None` when the tool deleted or renamed the file.
    fn read_current(&self) -> Result<Option<Vec<u8>>, ExecutionError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ExecutionError::io(&self.path, err)),
        }
    }
}

/// Snapshot of every tracked fixture in a case directory.
#[derive(Debug)]
pub struct FixtureGuard {
    fixtures: Vec<Fixture>,
    restored: bool,
}

impl FixtureGuard {
    /// Walk `dir` recursively and capture the bytes of every file whose
    /// extension is in `extensions`.
    pub fn snapshot<S: AsRef<str>>(dir: &Path, extensions: &[S]) -> Result<Self, ExecutionError> {
        let mut paths = Vec::new();
        collect(dir, extensions, &mut paths)?;
        paths.sort();

        let mut fixtures = Vec::with_capacity(paths.len());
        for path in paths {
            let original = fs::read(&path).map_err(|err| ExecutionError::io(&path, err))?;
            fixtures.push(Fixture {
                display: display_path(dir, &path),
                path,
                original,
                pass_one: None,
            });
        }

        Ok(Self {
            fixtures,
            restored: false,
        })
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// Store the current bytes as pass-one content and persist them next to
    /// each fixture as `<file>_fixed`. A fixture the pass removed gets no
    /// `_fixed` copy.
    pub fn record_pass_one(&mut self) -> Result<(), ExecutionError> {
        for fixture in &mut self.fixtures {
            let current = fixture.read_current()?;
            match &current {
                Some(bytes) => {
                    let sibling = fixed_sibling(&fixture.path);
                    fs::write(&sibling, bytes).map_err(|err| ExecutionError::io(&sibling, err))?;
                }
                None => log::warn!(
                    "[Fixture] {} vanished during the first fix pass",
                    fixture.display
                ),
            }
            fixture.pass_one = current;
        }
        Ok(())
    }

    /// Fixtures whose bytes moved since [`FixtureGuard::record_pass_one`].
    /// Appearing or disappearing counts as a change.
    pub fn changed_since_pass_one(&self) -> Result<BTreeSet<String>, ExecutionError> {
        let mut changed = BTreeSet::new();
        for fixture in &self.fixtures {
            if fixture.read_current()? != fixture.pass_one {
                changed.insert(fixture.display.clone());
            }
        }
        Ok(changed)
    }

    /// Write every fixture back to its original bytes. All fixtures are
    /// attempted even if one fails; the first failure is returned.
    pub fn restore(&mut self) -> Result<(), ExecutionError> {
        self.restored = true;
        let mut first_error = None;
        for fixture in &self.fixtures {
            if let Err(err) = fs::write(&fixture.path, &fixture.original) {
                let err = ExecutionError::FixtureRestoreFailed {
                    path: fixture.path.display().to_string(),
                    reason: err.to_string(),
                };
                log::error!("[Fixture] {}", err);
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for FixtureGuard {
    fn drop(&mut self) {
        if !self.restored {
            let _ = self.restore();
        }
    }
}

pub fn fixed_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(FIXED_SUFFIX);
    PathBuf::from(name)
}

fn collect<S: AsRef<str>>(
    dir: &Path,
    extensions: &[S],
    out: &mut Vec<PathBuf>,
) -> Result<(), ExecutionError> {
    let entries = fs::read_dir(dir).map_err(|err| ExecutionError::io(dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| ExecutionError::io(dir, err))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|err| ExecutionError::io(&path, err))?;
        if file_type.is_dir() {
            collect(&path, extensions, out)?;
        } else if file_type.is_file() {
            let ext = path.extension().and_then(|ext| ext.to_str());
            if extensions.iter().any(|wanted| Some(wanted.as_ref()) == ext) {
                out.push(path);
            }
        }
    }
    Ok(())
}

fn display_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|part| part.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("./{}", parts.join("/"))
}
