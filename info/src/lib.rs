/// The crate version the binaries were built from.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The source revision, if the build exported `CLEANPATH_REVISION`.
pub const REVISION: Option<&str> = option_env!("CLEANPATH_REVISION");

/// When the build ran, if the build exported `BUILD_TIMESTAMP`.
pub const BUILD_TIMESTAMP: Option<&str> = option_env!("BUILD_TIMESTAMP");

/// The name shown by hosts in banners and prompts.
pub const PRODUCT_NAME: &str = "CleanPath";
