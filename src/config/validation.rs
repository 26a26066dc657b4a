use crate::config::types::{Config, CrawlConfig, HttpConfig, OutputConfig, SelectorConfig};
use crate::crawler::compile_selector;
use crate::url::parse_start_url;
use crate::{ConfigError, HarvestError, InputError};
use reqwest::header::HeaderValue;
use std::time::Duration;

/// Validates the entire configuration, including the run inputs
pub fn validate(config: &Config) -> Result<(), HarvestError> {
    validate_crawl_config(&config.crawl)?;
    validate_sections(config)?;
    Ok(())
}

/// Validates the run inputs: start URL, page count and delay
pub fn validate_crawl_config(config: &CrawlConfig) -> Result<(), InputError> {
    parse_start_url(&config.start_url)?;

    if config.page_count < 1 {
        return Err(InputError::InvalidPageCount(config.page_count));
    }

    // Rejects negative, NaN, infinite and out-of-range values
    if Duration::try_from_secs_f64(config.delay_seconds).is_err() {
        return Err(InputError::InvalidDelay(config.delay_seconds));
    }

    Ok(())
}

/// Validates everything that can come from the config file
pub(crate) fn validate_sections(config: &Config) -> Result<(), ConfigError> {
    if config.crawl.page_param.is_empty() {
        return Err(ConfigError::Validation(
            "page_param cannot be empty".to_string(),
        ));
    }

    validate_http_config(&config.http)?;
    validate_output_config(&config.output)?;
    validate_selector_config(&config.selectors)?;
    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.timeout_seconds < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_seconds must be >= 1, got {}",
            config.timeout_seconds
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("user_agent", &config.user_agent),
        ("accept_language", &config.accept_language),
    ] {
        if HeaderValue::from_str(value).is_err() {
            return Err(ConfigError::Validation(format!(
                "{} is not a valid HTTP header value: {:?}",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if let Some(prefix) = &config.prefix {
        validate_prefix(prefix)?;
    }

    Ok(())
}

/// A prefix becomes part of a file name, so it must not contain path separators
fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    if prefix.is_empty() {
        return Err(ConfigError::Validation(
            "output prefix cannot be empty".to_string(),
        ));
    }

    if prefix.contains(['/', '\\']) || prefix == "." || prefix == ".." {
        return Err(ConfigError::Validation(format!(
            "output prefix '{}' must be a plain file name component",
            prefix
        )));
    }

    Ok(())
}

/// Validates that every selector is present and parses
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (field, selector) in [
        ("container", &config.container),
        ("title", &config.title),
        ("price", &config.price),
        ("time-listed", &config.time_listed),
        ("location", &config.location),
    ] {
        compile_selector(field, selector)?;
    }

    if config
        .promoted_class_prefixes
        .iter()
        .any(|p| p.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "promoted_class_prefixes cannot contain empty entries".to_string(),
        ));
    }

    if config.location_separator.is_empty() {
        return Err(ConfigError::Validation(
            "location_separator cannot be empty".to_string(),
        ));
    }

    Ok(())
}
