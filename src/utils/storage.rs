use crate::utils::state::Config;

/// Normalize a stored media reference into a frontend-usable URL.
/// Bare object keys get the public media host prepended.
pub fn normalize_url(url: Option<String>, config: &Config) -> Option<String> {
    match url {
        Some(u) if !u.contains("://") => Some(format!("{}/{}", config.media_public_url, u)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            signature_key: "k".to_string(),
            url: "localhost:8080".to_string(),
            server_id: 0,
            media_public_url: "https://media.test".to_string(),
        }
    }

    #[test]
    fn bare_keys_get_host() {
        let config = test_config();
        assert_eq!(
            normalize_url(Some("avatars/a.png".to_string()), &config),
            Some("https://media.test/avatars/a.png".to_string())
        );
    }

    #[test]
    fn absolute_urls_pass_through() {
        let config = test_config();
        assert_eq!(
            normalize_url(Some("https://x.test/a.png".to_string()), &config),
            Some("https://x.test/a.png".to_string())
        );
        assert_eq!(normalize_url(None, &config), None);
    }
}
