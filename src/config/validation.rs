use crate::config::types::{
    ClassifierConfig, Config, CrawlerConfig, DomainEntry, OutputConfig, RenderBackendKind,
    RenderConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_classifier_config(&config.classifier)?;
    validate_render_config(&config.render)?;
    validate_domains(&config.domains)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.fetch_concurrency < 1 || config.fetch_concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "fetch_concurrency must be between 1 and 100, got {}",
            config.fetch_concurrency
        )));
    }

    if config.render_concurrency < 1 || config.render_concurrency > 20 {
        return Err(ConfigError::Validation(format!(
            "render_concurrency must be between 1 and 20, got {}",
            config.render_concurrency
        )));
    }

    if config.batch_size < 1 {
        return Err(ConfigError::Validation(
            "batch_size must be >= 1".to_string(),
        ));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1".to_string(),
        ));
    }

    for (name, value) in [
        ("fetch_timeout_ms", config.fetch_timeout_ms),
        ("render_timeout_ms", config.render_timeout_ms),
    ] {
        if value < 100 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 100ms, got {}ms",
                name, value
            )));
        }
    }

    if config.max_body_bytes < 1024 {
        return Err(ConfigError::Validation(format!(
            "max_body_bytes must be >= 1024, got {}",
            config.max_body_bytes
        )));
    }

    if config.flush_threshold < 1 {
        return Err(ConfigError::Validation(
            "flush_threshold must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates product pattern lists and the confidence threshold
fn validate_classifier_config(config: &ClassifierConfig) -> Result<(), ConfigError> {
    for segment in &config.product_path_segments {
        if segment.is_empty() || segment.contains('/') {
            return Err(ConfigError::InvalidPattern(format!(
                "product path segment '{}' must be a single non-empty path segment",
                segment
            )));
        }
    }

    if config.product_query_keys.iter().any(|k| k.is_empty()) {
        return Err(ConfigError::InvalidPattern(
            "product query keys cannot be empty".to_string(),
        ));
    }

    if config.confidence_threshold == 0 {
        return Err(ConfigError::Validation(
            "confidence_threshold must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates render configuration
fn validate_render_config(config: &RenderConfig) -> Result<(), ConfigError> {
    if config.backend == RenderBackendKind::Chrome && !cfg!(feature = "chrome") {
        return Err(ConfigError::Validation(
            "render backend 'chrome' requires building with the `chrome` feature".to_string(),
        ));
    }

    if config.blocked_hosts.iter().any(|h| h.trim().is_empty()) {
        return Err(ConfigError::InvalidPattern(
            "blocked hosts cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the domain list
fn validate_domains(domains: &[DomainEntry]) -> Result<(), ConfigError> {
    if domains.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[domain]] entry is required".to_string(),
        ));
    }

    for entry in domains {
        let url = Url::parse(&entry.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid domain URL '{}': {}", entry.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Domain URL '{}' must use http or https",
                entry.url
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(format!(
                "Domain URL '{}' has no host",
                entry.url
            )));
        }

        if entry.max_pages == Some(0) {
            return Err(ConfigError::Validation(format!(
                "max_pages for '{}' must be >= 1",
                entry.url
            )));
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawler() -> CrawlerConfig {
        CrawlerConfig {
            max_depth: 2,
            max_pages: 100,
            batch_size: 10,
            fetch_concurrency: 8,
            render_concurrency: 2,
            fetch_timeout_ms: 1000,
            render_timeout_ms: 1000,
            max_body_bytes: 1 << 20,
            flush_threshold: 10,
            max_renders: None,
        }
    }

    fn domain(url: &str) -> DomainEntry {
        DomainEntry {
            url: url.to_string(),
            max_depth: None,
            max_pages: None,
        }
    }

    #[test]
    fn test_validate_crawler_bounds() {
        assert!(validate_crawler_config(&crawler()).is_ok());

        let mut c = crawler();
        c.render_concurrency = 21;
        assert!(validate_crawler_config(&c).is_err());

        let mut c = crawler();
        c.fetch_timeout_ms = 50;
        assert!(validate_crawler_config(&c).is_err());

        let mut c = crawler();
        c.flush_threshold = 0;
        assert!(validate_crawler_config(&c).is_err());
    }

    #[test]
    fn test_validate_domains() {
        assert!(validate_domains(&[domain("https://shop.example/")]).is_ok());
        assert!(validate_domains(&[domain("http://127.0.0.1:8080/")]).is_ok());

        assert!(validate_domains(&[]).is_err());
        assert!(validate_domains(&[domain("shop.example")]).is_err());
        assert!(validate_domains(&[domain("ftp://shop.example/")]).is_err());
    }

    #[test]
    fn test_validate_classifier_patterns() {
        assert!(validate_classifier_config(&ClassifierConfig::default()).is_ok());

        let mut c = ClassifierConfig::default();
        c.product_path_segments.push("a/b".to_string());
        assert!(validate_classifier_config(&c).is_err());

        let mut c = ClassifierConfig::default();
        c.confidence_threshold = 0;
        assert!(validate_classifier_config(&c).is_err());
    }

    #[test]
    fn test_chrome_backend_requires_feature() {
        let config = RenderConfig {
            backend: RenderBackendKind::Chrome,
            ..RenderConfig::default()
        };
        assert_eq!(
            validate_render_config(&config).is_ok(),
            cfg!(feature = "chrome")
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@domain").is_err());
    }
}
