//! Fixed names used when no configuration overrides them

/// Directory under the user config dir holding `config.toml`
pub const CONFIG_DIR_NAME: &str = "llvmpkg";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Staging directory names below the staging root
pub const SOURCE_DIR: &str = "src";
pub const BUILD_DIR: &str = "build";
pub const INSTALL_DIR: &str = "install";
pub const PACKAGE_DIR: &str = "package";

pub const MIRROR_BASE_URL: &str = "https://bintray.com/artifact/download/polysquare/LLVM";
pub const UPSTREAM_BASE_URL: &str = "https://releases.llvm.org";

/// Parallel job hint for the compile step
pub const DEFAULT_BUILD_JOBS: usize = 4;
pub const DEFAULT_BUILD_PROGRAM: &str = "cmake";
pub const DEFAULT_TARGETS: &str = "X86";
