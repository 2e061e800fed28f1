use log::LevelFilter;
use simplelog::{ConfigBuilder, SimpleLogger};

/// Console logger for local runs, where nothing is shipped to logfire
pub fn setup_simple_logger() -> anyhow::Result<()> {
    let logger_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("storefront")
        .add_filter_allow_str("ntex")
        .build();

    Ok(SimpleLogger::init(LevelFilter::Info, logger_config)?)
}
