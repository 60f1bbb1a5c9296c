//! Sanity module registry.
//!
//! A sanity test is named after the toolchain module it exercises. The module
//! may live in any of the configured namespaces; lookup happens once, right
//! after discovery, and the executor only consults the finished map.

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{SanityConfig, ToolTarget};
use crate::error::ExecutionError;

/// A sanity test name resolved to a runnable module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanityTarget {
    pub namespace: String,
    pub module: String,
}

impl SanityTarget {
    pub fn tool_target(&self) -> ToolTarget {
        ToolTarget::module(format!("{}.{}", self.namespace, self.module))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SanityRegistry {
    namespaces: Vec<String>,
    resolved: BTreeMap<String, SanityTarget>,
}

impl SanityRegistry {
    /// Resolve every name against `<toolchain_root>/<namespace>/<name>.<ext>`,
    /// first namespace wins.
    pub fn build<'a, I>(names: I, config: &SanityConfig, toolchain_root: &Path) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut resolved = BTreeMap::new();
        for name in names {
            let file_name = format!("{}.{}", name, config.module_extension);
            let hit = config
                .namespaces
                .iter()
                .find(|namespace| toolchain_root.join(namespace).join(&file_name).is_file());
            match hit {
                Some(namespace) => {
                    resolved.insert(
                        name.to_string(),
                        SanityTarget {
                            namespace: namespace.clone(),
                            module: name.to_string(),
                        },
                    );
                }
                None => log::warn!("[Sanity] no module found for sanity test {}", name),
            }
        }

        Self {
            namespaces: config.namespaces.clone(),
            resolved,
        }
    }

    pub fn resolve(&self, name: &str) -> Result<&SanityTarget, ExecutionError> {
        self.resolved
            .get(name)
            .ok_or_else(|| ExecutionError::UnresolvedModule {
                name: name.to_string(),
                namespaces: self.namespaces.clone(),
            })
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}
