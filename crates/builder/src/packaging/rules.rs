//! Copy rules mapping install subtrees to package categories

use globset::{GlobBuilder, GlobMatcher};
use llvmpkg_errors::{Error, PackagingError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Copy files under `source` matching `pattern` into `destination`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    /// Glob matched against the path relative to `source`; `*` crosses `/`
    pub pattern: String,
    /// Subtree of the install tree
    pub source: PathBuf,
    /// Category directory in the package tree
    pub destination: String,
    /// Keep the path relative to `source` instead of flattening
    pub keep_path: bool,
}

impl CopyRule {
    pub fn new(
        pattern: impl Into<String>,
        source: impl Into<PathBuf>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            source: source.into(),
            destination: destination.into(),
            keep_path: true,
        }
    }

    #[must_use]
    pub fn flatten(mut self) -> Self {
        self.keep_path = false;
        self
    }

    /// Compile the pattern
    ///
    /// # Errors
    ///
    /// Returns `PackagingError::InvalidPattern` if the glob does not parse.
    pub fn matcher(&self) -> Result<GlobMatcher, Error> {
        GlobBuilder::new(&self.pattern)
            .literal_separator(false)
            .build()
            .map(|glob| glob.compile_matcher())
            .map_err(|e| {
                PackagingError::InvalidPattern {
                    pattern: self.pattern.clone(),
                    message: e.to_string(),
                }
                .into()
            })
    }

    /// Package path for a matched file
    #[must_use]
    pub fn target(&self, package_dir: &Path, relative: &Path) -> PathBuf {
        let category = package_dir.join(&self.destination);
        if self.keep_path {
            category.join(relative)
        } else {
            relative
                .file_name()
                .map_or_else(|| category.join(relative), |name| category.join(name))
        }
    }
}

/// Library file classes collected from `lib`
pub const LIBRARY_PATTERNS: &[&str] = &[
    "*.a", "*.h", "*.so", "*.dylib", "*.lib", "*.cmake", "*.dll",
];

/// Standard package layout
#[must_use]
pub fn default_rules() -> Vec<CopyRule> {
    let mut rules = vec![CopyRule::new("*", "include", "include")];
    rules.extend(
        LIBRARY_PATTERNS
            .iter()
            .map(|pattern| CopyRule::new(*pattern, "lib", "lib")),
    );
    rules.push(CopyRule::new("*", "share", "share"));
    rules.push(CopyRule::new("*", "bin", "bin"));
    rules.push(CopyRule::new("*", "libexec", "libexec"));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_crosses_directories() {
        let rule = CopyRule::new("*.cmake", "lib", "lib");
        let matcher = rule.matcher().unwrap();
        assert!(matcher.is_match("cmake/llvm/LLVMConfig.cmake"));
        assert!(matcher.is_match("LLVMExports.cmake"));
        assert!(!matcher.is_match("libLLVMCore.a"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let rule = CopyRule::new("[unclosed", "lib", "lib");
        assert!(matches!(
            rule.matcher().unwrap_err(),
            Error::Packaging(PackagingError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn target_keeps_or_flattens() {
        let rule = CopyRule::new("*", "include", "include");
        let rel = Path::new("llvm/IR/Module.h");
        assert_eq!(
            rule.target(Path::new("/pkg"), rel),
            PathBuf::from("/pkg/include/llvm/IR/Module.h")
        );
        assert_eq!(
            rule.flatten().target(Path::new("/pkg"), rel),
            PathBuf::from("/pkg/include/Module.h")
        );
    }

    #[test]
    fn default_table_shape() {
        let rules = default_rules();
        assert_eq!(rules.len(), 11);
        assert!(rules.iter().all(|r| r.keep_path));
        assert_eq!(
            rules.iter().filter(|r| r.destination == "lib").count(),
            LIBRARY_PATTERNS.len()
        );
    }
}
