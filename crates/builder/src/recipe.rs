//! The LLVM package recipe
//!
//! Declares which components make up each source set, the default toggle
//! table handed to CMake, the package metadata and the copy rules.

use crate::build_systems::{BuildConfiguration, FeatureToggle};
use crate::fetch::ComponentSpec;
use crate::packaging::{default_rules, CopyRule};
use llvmpkg_config::{BuildConfig, Config, SourceVariant};
use llvmpkg_types::{PackageMetadata, Settings};

/// libunwind is published under its own release number
pub const LIBUNWIND_RELEASE: &str = "1.1";

/// Tools, tests and documentation never built into the package
const DISABLED_TOGGLES: &[&str] = &[
    "LLVM_INCLUDE_TESTS",
    "LLVM_BUILD_TESTS",
    "LLVM_INCLUDE_EXAMPLES",
    "LLVM_BUILD_EXAMPLES",
    "LLVM_INCLUDE_DOCS",
    "LLVM_BUILD_DOCS",
    "LLVM_INCLUDE_GO_TESTS",
    "LLVM_INCLUDE_BENCHMARKS",
    "LLVM_BUILD_BENCHMARKS",
    "LLVM_TOOL_BUGPOINT_BUILD",
    "LLVM_TOOL_BUGPOINT_PASSES_BUILD",
    "LLVM_TOOL_LLI_BUILD",
    "LLVM_TOOL_LLVM_BCANALYZER_BUILD",
    "LLVM_TOOL_LLVM_C_TEST_BUILD",
    "LLVM_TOOL_LLVM_CXXDUMP_BUILD",
    "LLVM_TOOL_LLVM_DIFF_BUILD",
    "LLVM_TOOL_LLVM_DSYMUTIL_BUILD",
    "LLVM_TOOL_LLVM_DWARFDUMP_BUILD",
    "LLVM_TOOL_LLVM_EXTRACT_BUILD",
    "LLVM_TOOL_LLVM_GO_BUILD",
    "LLVM_TOOL_LLVM_MCMARKUP_BUILD",
    "LLVM_TOOL_LLVM_PDBDUMP_BUILD",
    "LLVM_TOOL_LLVM_STRESS_BUILD",
    "LLVM_TOOL_OBJ2YAML_BUILD",
    "LLVM_TOOL_YAML2OBJ_BUILD",
    "LLVM_TOOL_SANCOV_BUILD",
    "LLVM_TOOL_VERIFY_USELISTORDER_BUILD",
    "LLVM_TOOL_XCODE_TOOLCHAIN_BUILD",
    "CLANG_INCLUDE_TESTS",
    "CLANG_INCLUDE_DOCS",
];

/// Front-end and runtime toggles with the component each one builds
const COMPONENT_TOGGLES: &[(&str, &str)] = &[
    ("LLVM_TOOL_CLANG_BUILD", "cfe"),
    ("LLVM_TOOL_COMPILER_RT_BUILD", "compiler-rt"),
    ("LLVM_TOOL_LIBCXX_BUILD", "libcxx"),
    ("LLVM_TOOL_LIBCXXABI_BUILD", "libcxxabi"),
    ("LLVM_TOOL_LIBUNWIND_BUILD", "libunwind"),
    ("LLVM_TOOL_CLANG_TOOLS_EXTRA_BUILD", "clang-tools-extra"),
];

/// LLVM at one release, with one source set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlvmRecipe {
    version: String,
    variant: SourceVariant,
}

impl LlvmRecipe {
    pub fn new(version: impl Into<String>, variant: SourceVariant) -> Self {
        Self {
            version: version.into(),
            variant,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.package_version(), config.source.variant)
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn variant(&self) -> SourceVariant {
        self.variant
    }

    #[must_use]
    pub fn metadata(&self) -> PackageMetadata {
        PackageMetadata::llvm(&self.version)
    }

    /// Components to fetch, in fetch order
    #[must_use]
    pub fn components(&self) -> Vec<ComponentSpec> {
        let v = self.version.as_str();
        let mut specs = vec![ComponentSpec::new("llvm", v, ".")];
        if self.variant == SourceVariant::Full {
            specs.extend([
                ComponentSpec::new("cfe", v, "tools/clang"),
                ComponentSpec::new("compiler-rt", v, "projects/compiler-rt"),
                ComponentSpec::new("libcxx", v, "projects/libcxx"),
                ComponentSpec::new("libcxxabi", v, "projects/libcxxabi"),
                ComponentSpec::new("libunwind", LIBUNWIND_RELEASE, "projects/libunwind"),
                ComponentSpec::new("clang-tools-extra", v, "tools/clang/tools/extra"),
            ]);
        }
        specs
    }

    /// Default toggle table
    ///
    /// Component toggles are ON only for the full source set.
    #[must_use]
    pub fn toggles(&self) -> Vec<FeatureToggle> {
        let full = self.variant == SourceVariant::Full;
        DISABLED_TOGGLES
            .iter()
            .map(|name| FeatureToggle::off(*name))
            .chain(COMPONENT_TOGGLES.iter().map(|(name, component)| {
                let toggle = if full {
                    FeatureToggle::on(*name)
                } else {
                    FeatureToggle::off(*name)
                };
                toggle.requires(*component)
            }))
            .collect()
    }

    /// Build configuration for `settings` with `[build]` overrides applied
    #[must_use]
    pub fn build_configuration(&self, settings: Settings, build: &BuildConfig) -> BuildConfiguration {
        let mut config = BuildConfiguration {
            settings,
            shared: build.shared,
            jobs: build.jobs,
            targets: build.targets.clone(),
            generator: build.generator.clone(),
            toggles: self.toggles(),
        };
        config.apply_overrides(&build.toggles);
        config
    }

    #[must_use]
    pub fn copy_rules(&self) -> Vec<CopyRule> {
        default_rules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::SourceManifest;
    use std::path::PathBuf;

    #[test]
    fn full_source_set() {
        let recipe = LlvmRecipe::new("3.8.0", SourceVariant::Full);
        let specs = recipe.components();
        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "llvm",
                "cfe",
                "compiler-rt",
                "libcxx",
                "libcxxabi",
                "libunwind",
                "clang-tools-extra"
            ]
        );
        let unwind = specs.iter().find(|s| s.name == "libunwind").unwrap();
        assert_eq!(unwind.version, "1.1");
        assert_eq!(unwind.destination, PathBuf::from("projects/libunwind"));
        assert_eq!(specs[0].destination, PathBuf::from("."));
    }

    #[test]
    fn minimal_source_set_disables_component_toggles() {
        let recipe = LlvmRecipe::new("3.8.0", SourceVariant::Minimal);
        assert_eq!(recipe.components().len(), 1);

        let toggles = recipe.toggles();
        assert!(toggles.iter().all(|t| !t.enabled));
        let manifest = SourceManifest {
            components: recipe.components(),
        };
        let config = recipe.build_configuration(Settings::host(), &BuildConfig::default());
        assert!(config.check_components(&manifest).is_ok());
    }

    #[test]
    fn full_toggles_match_full_components() {
        let recipe = LlvmRecipe::new("3.8.0", SourceVariant::Full);
        let manifest = SourceManifest {
            components: recipe.components(),
        };
        let config = recipe.build_configuration(Settings::host(), &BuildConfig::default());
        assert!(config.check_components(&manifest).is_ok());
        assert!(config
            .toggles
            .iter()
            .any(|t| t.name == "LLVM_TOOL_CLANG_BUILD" && t.enabled));
        assert!(config
            .toggles
            .iter()
            .any(|t| t.name == "LLVM_BUILD_TESTS" && !t.enabled));
    }

    #[test]
    fn component_toggles_use_tool_options() {
        let recipe = LlvmRecipe::new("3.8.0", SourceVariant::Full);
        let component_toggles: Vec<_> = recipe
            .toggles()
            .into_iter()
            .filter(|t| t.requires.is_some())
            .collect();
        assert_eq!(component_toggles.len(), 6);
        assert!(component_toggles
            .iter()
            .all(|t| t.enabled && t.name.starts_with("LLVM_TOOL_") && t.name.ends_with("_BUILD")));

        let extra = component_toggles
            .iter()
            .find(|t| t.requires.as_deref() == Some("clang-tools-extra"))
            .unwrap();
        assert_eq!(extra.name, "LLVM_TOOL_CLANG_TOOLS_EXTRA_BUILD");
    }

    #[test]
    fn overrides_from_config() {
        let recipe = LlvmRecipe::new("3.8.0", SourceVariant::Minimal);
        let mut build = BuildConfig::default();
        build.shared = false;
        build.toggles.insert("LLVM_TOOL_CLANG_BUILD".into(), true);
        let config = recipe.build_configuration(Settings::host(), &build);
        assert!(!config.shared);

        let manifest = SourceManifest {
            components: recipe.components(),
        };
        assert!(config.check_components(&manifest).is_err());
    }

    #[test]
    fn metadata_uses_version() {
        let recipe = LlvmRecipe::new("3.9.0", SourceVariant::Full);
        assert_eq!(recipe.metadata().reference(), "llvm/3.9.0");
    }
}
