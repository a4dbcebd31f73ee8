//! Packager: copy the install tree into the package layout
//!
//! Rules are independent of each other. Files are written through a
//! temporary sibling and persisted into place, and the install tree is only
//! ever read.

mod rules;

pub use rules::{default_rules, CopyRule, LIBRARY_PATTERNS};

use crate::utils::fileops::ensure_dir;
use globset::GlobMatcher;
use llvmpkg_errors::{Error, PackagingError};
use llvmpkg_events::{AppEvent, EventEmitter, EventSender, PackageEvent};
use llvmpkg_types::PackageReport;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Applies a copy-rule table
pub struct Packager {
    rules: Vec<CopyRule>,
    tx: EventSender,
}

impl EventEmitter for Packager {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

impl Packager {
    #[must_use]
    pub fn new(rules: Vec<CopyRule>, tx: EventSender) -> Self {
        Self { rules, tx }
    }

    /// Packager with the standard layout
    #[must_use]
    pub fn with_default_rules(tx: EventSender) -> Self {
        Self::new(default_rules(), tx)
    }

    #[must_use]
    pub fn rules(&self) -> &[CopyRule] {
        &self.rules
    }

    /// Populate `package_dir` from `install_dir`
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::InstallTreeMissing` if `install_dir` is not a
    /// directory, `PackagingError::InvalidPattern` before any copy if a rule
    /// does not compile, and `PackagingError::CopyFailed` for I/O failures.
    pub async fn package(
        &self,
        install_dir: &Path,
        package_dir: &Path,
    ) -> Result<PackageReport, Error> {
        if !install_dir.is_dir() {
            return Err(PackagingError::InstallTreeMissing {
                path: install_dir.display().to_string(),
            }
            .into());
        }
        let compiled = self
            .rules
            .iter()
            .map(|rule| rule.matcher().map(|matcher| (rule.clone(), matcher)))
            .collect::<Result<Vec<_>, Error>>()?;
        ensure_dir(package_dir).await?;

        let install_dir = install_dir.to_path_buf();
        let package_dir = package_dir.to_path_buf();
        let tx = self.tx.clone();
        let files = {
            let package_dir = package_dir.clone();
            tokio::task::spawn_blocking(move || {
                let mut files = BTreeMap::new();
                for (rule, matcher) in &compiled {
                    let copied = apply_rule(rule, matcher, &install_dir, &package_dir)?;
                    tx.emit(AppEvent::Package(PackageEvent::RuleApplied {
                        pattern: rule.pattern.clone(),
                        source: rule.source.display().to_string(),
                        destination: rule.destination.clone(),
                        files_copied: copied,
                    }));
                    if copied > 0 {
                        *files.entry(rule.destination.clone()).or_insert(0) += copied;
                    }
                }
                Ok::<_, Error>(files)
            })
            .await
            .map_err(|e| Error::internal(format!("packaging task failed: {e}")))??
        };

        let report = PackageReport { package_dir, files };
        self.emit(AppEvent::Package(PackageEvent::Completed {
            package_dir: report.package_dir.clone(),
            files_copied: report.total_files(),
        }));
        Ok(report)
    }
}

/// Copy every file under the rule's source matching its pattern
fn apply_rule(
    rule: &CopyRule,
    matcher: &GlobMatcher,
    install_dir: &Path,
    package_dir: &Path,
) -> Result<usize, Error> {
    let root = install_dir.join(&rule.source);
    if !root.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in ignore::WalkBuilder::new(&root)
        .standard_filters(false)
        .follow_links(false)
        .build()
    {
        let entry = entry.map_err(|e| PackagingError::CopyFailed {
            path: root.display().to_string(),
            message: e.to_string(),
        })?;
        let path = entry.path();
        // Symlinks to files are copied by content
        if !path.is_file() {
            continue;
        }
        let Ok(relative) = path.strip_prefix(&root) else {
            continue;
        };
        if !matcher.is_match(relative) {
            continue;
        }
        copy_atomically(path, &rule.target(package_dir, relative))?;
        copied += 1;
    }
    Ok(copied)
}

fn copy_atomically(src: &Path, dest: &Path) -> Result<(), Error> {
    let failed = |path: &Path, e: &dyn std::fmt::Display| -> Error {
        PackagingError::CopyFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into()
    };

    let parent = dest.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    std::fs::create_dir_all(&parent).map_err(|e| failed(&parent, &e))?;

    let mut input = std::fs::File::open(src).map_err(|e| failed(src, &e))?;
    let mut temp = NamedTempFile::new_in(&parent).map_err(|e| failed(dest, &e))?;
    std::io::copy(&mut input, temp.as_file_mut()).map_err(|e| failed(src, &e))?;

    let permissions = input
        .metadata()
        .map_err(|e| failed(src, &e))?
        .permissions();
    temp.as_file()
        .set_permissions(permissions)
        .map_err(|e| failed(dest, &e))?;

    temp.persist(dest).map_err(|e| failed(dest, &e.error))?;
    Ok(())
}
