//! Settings axes of a package build
//!
//! A [`Settings`] value is what an outer build matrix hands to one pipeline
//! invocation: target OS, compiler identity and version, architecture and
//! build type.

use llvmpkg_errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Macos,
    Windows,
}

impl Os {
    /// Operating system of the running host
    #[must_use]
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::Macos,
            _ => Self::Linux,
        }
    }

    #[must_use]
    pub fn is_windows(self) -> bool {
        matches!(self, Self::Windows)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "macos" | "darwin" => Ok(Self::Macos),
            "windows" => Ok(Self::Windows),
            _ => Err(ConfigError::InvalidValue {
                field: "os".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl clap::ValueEnum for Os {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Linux, Self::Macos, Self::Windows]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Target architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    X86,
    X86_64,
    Armv8,
}

impl Arch {
    /// Architecture of the running host
    #[must_use]
    pub fn host() -> Self {
        match std::env::consts::ARCH {
            "x86" => Self::X86,
            "aarch64" => Self::Armv8,
            _ => Self::X86_64,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Armv8 => "armv8",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "i686" => Ok(Self::X86),
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "armv8" | "aarch64" | "arm64" => Ok(Self::Armv8),
            _ => Err(ConfigError::InvalidValue {
                field: "arch".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl clap::ValueEnum for Arch {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::X86, Self::X86_64, Self::Armv8]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// CMake build type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BuildType {
    #[default]
    Release,
    Debug,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// Name as understood by `CMAKE_BUILD_TYPE` and `--config`
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Release => "Release",
            Self::Debug => "Debug",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "release" => Ok(Self::Release),
            "debug" => Ok(Self::Debug),
            "relwithdebinfo" => Ok(Self::RelWithDebInfo),
            "minsizerel" => Ok(Self::MinSizeRel),
            _ => Err(ConfigError::InvalidValue {
                field: "build_type".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl clap::ValueEnum for BuildType {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::Release,
            Self::Debug,
            Self::RelWithDebInfo,
            Self::MinSizeRel,
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// Compiler family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompilerKind {
    Gcc,
    Clang,
    AppleClang,
    VisualStudio,
}

impl CompilerKind {
    /// Default compiler family for a target OS
    #[must_use]
    pub fn default_for(os: Os) -> Self {
        match os {
            Os::Linux => Self::Gcc,
            Os::Macos => Self::AppleClang,
            Os::Windows => Self::VisualStudio,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::AppleClang => "apple-clang",
            Self::VisualStudio => "Visual Studio",
        }
    }
}

impl FromStr for CompilerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcc" => Ok(Self::Gcc),
            "clang" => Ok(Self::Clang),
            "apple-clang" | "apple_clang" => Ok(Self::AppleClang),
            "visual studio" | "msvc" | "visual_studio" => Ok(Self::VisualStudio),
            _ => Err(ConfigError::InvalidValue {
                field: "compiler".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Compiler identity and version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compiler {
    pub kind: CompilerKind,
    pub version: Option<String>,
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {version}", self.kind.as_str()),
            None => f.write_str(self.kind.as_str()),
        }
    }
}

/// One point of the settings matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub os: Os,
    pub compiler: Compiler,
    pub arch: Arch,
    pub build_type: BuildType,
}

impl Settings {
    /// Settings describing a release build for the running host
    #[must_use]
    pub fn host() -> Self {
        let os = Os::host();
        Self {
            os,
            compiler: Compiler {
                kind: CompilerKind::default_for(os),
                version: None,
            },
            arch: Arch::host(),
            build_type: BuildType::Release,
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {} ({})",
            self.os, self.arch, self.build_type, self.compiler
        )
    }
}
