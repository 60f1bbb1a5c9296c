//! Test case discovery.
//!
//! Each immediate subdirectory of `<test-root>/<kind-dir>` is one test case;
//! nothing below that level is inspected here. Discovery also records platform
//! markers and resolves sanity modules so executors never touch the catalog.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{HarnessConfig, ToolTarget};
use crate::error::DiscoveryError;
use crate::kind::TestKind;

pub mod platform;
pub mod registry;

pub use platform::Platform;
pub use registry::{SanityRegistry, SanityTarget};

/// One fixture directory paired with the kind that exercises it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub kind: TestKind,
    pub name: String,
    pub dir: PathBuf,
    /// Host the fixture is restricted to, from an `ONLY_<PLATFORM>` marker
    pub restricted_to: Option<Platform>,
}

impl TestCase {
    /// `<kind-dir>/<name>`, used in logs and reports.
    pub fn id(&self) -> String {
        format!("{}/{}", self.kind.dir_name(), self.name)
    }

    /// Platform restriction that rules this case out on `host`, if any.
    pub fn excluded_on(&self, host: Platform) -> Option<Platform> {
        self.restricted_to.filter(|platform| *platform != host)
    }

    /// File name of this case's coverage snapshot inside the test root.
    pub fn coverage_snapshot_name(&self, data_file: &str) -> String {
        format!("{}.{}.{}", data_file, self.kind.dir_name(), self.name)
    }
}

/// Everything the scheduler needs: the flat case list plus resolved sanity modules.
#[derive(Debug, Clone)]
pub struct TestPlan {
    pub cases: Vec<TestCase>,
    pub sanity: SanityRegistry,
}

/// Catalog responsible for discovering test cases on disk.
pub struct TestCatalog {
    root: PathBuf,
}

impl TestCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Check that the harness is pointed at a real toolchain checkout before
    /// anything is erased or executed.
    pub fn preflight(&self, config: &HarnessConfig) -> Result<(), DiscoveryError> {
        let toolchain = config.resolved_toolchain_root(&self.root);
        if let ToolTarget::Script { path } = &config.tools.style {
            let script = toolchain.join(path);
            if !script.is_file() {
                return Err(DiscoveryError::ToolchainMissing {
                    path: script.display().to_string(),
                });
            }
        }
        if let Some(namespace) = config.sanity.namespaces.first() {
            let package = toolchain.join(namespace);
            if !package.is_dir() {
                return Err(DiscoveryError::ToolchainMissing {
                    path: package.display().to_string(),
                });
            }
        }
        Ok(())
    }

    /// List the test cases of every requested kind, kinds in the given order
    /// and names sorted within each kind.
    pub fn discover(&self, kinds: &[TestKind]) -> Result<Vec<TestCase>, DiscoveryError> {
        let mut cases = Vec::new();
        for &kind in kinds {
            let kind_root = self.root.join(kind.dir_name());
            if !kind_root.is_dir() {
                return Err(DiscoveryError::KindRootMissing {
                    path: kind_root.display().to_string(),
                });
            }

            let listing_error = |err: std::io::Error| DiscoveryError::ListingFailed {
                path: kind_root.display().to_string(),
                reason: err.to_string(),
            };

            let mut found = Vec::new();
            for entry in fs::read_dir(&kind_root).map_err(listing_error)? {
                let entry = entry.map_err(listing_error)?;
                if !entry.file_type().map_err(listing_error)?.is_dir() {
                    continue;
                }
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    return Err(DiscoveryError::InvalidCaseName {
                        path: entry.path().display().to_string(),
                    });
                };
                let dir = entry.path();
                found.push(TestCase {
                    kind,
                    name,
                    restricted_to: Platform::restriction_for(&dir),
                    dir,
                });
            }

            found.sort_by(|a, b| a.name.cmp(&b.name));
            log::debug!("[Discovery] {} test cases under {}", found.len(), kind);
            cases.extend(found);
        }
        Ok(cases)
    }

    /// Discover cases and resolve the sanity registry in one step.
    pub fn plan(
        &self,
        kinds: &[TestKind],
        config: &HarnessConfig,
    ) -> Result<TestPlan, DiscoveryError> {
        let cases = self.discover(kinds)?;
        let toolchain = config.resolved_toolchain_root(&self.root);
        let sanity_names: Vec<&str> = cases
            .iter()
            .filter(|case| case.kind == TestKind::Sanity)
            .map(|case| case.name.as_str())
            .collect();
        let sanity =
            SanityRegistry::build(sanity_names.iter().copied(), &config.sanity, &toolchain);
        if !sanity_names.is_empty() && sanity.is_empty() {
            log::warn!(
                "[Discovery] none of {} sanity tests resolved under {}",
                sanity_names.len(),
                toolchain.display()
            );
        } else {
            log::debug!(
                "[Discovery] resolved {} of {} sanity modules",
                sanity.len(),
                sanity_names.len()
            );
        }
        Ok(TestPlan { cases, sanity })
    }
}

/// Files directly inside `dir` with the given extension, sorted by name.
///
/// A matching file whose name is not UTF-8 is an `InvalidData` error.
pub fn files_with_extension(dir: &Path, extension: &str) -> std::io::Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => files.push(name.to_string()),
            None => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("non UTF-8 file name {}", path.display()),
                ))
            }
        }
    }
    files.sort();
    Ok(files)
}
