//! Environment variable source: ARCHIVE_DIRS_ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `ARCHIVE_DIRS_ARCHIVE__ROOTS=/badc,/neodc` sets a list.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("ARCHIVE_DIRS")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("archive.roots")
            .try_parsing(true),
    );
    Ok(builder)
}
