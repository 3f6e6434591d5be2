//! Resolution of stored image paths to publicly fetchable URLs.

use url::Url;

use crate::config::MediaConfig;

/// Resolves `image_path` values from product records against the public
/// object storage host.
///
/// Resolution is pure URL construction and assumed to succeed; a missing
/// object is the presentation layer's broken-image problem, not ours.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base: Url,
}

impl ImageResolver {
    /// Build a resolver from media configuration.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the configured base URL is invalid.
    pub fn new(config: &MediaConfig) -> Result<Self, url::ParseError> {
        // Normalize so join() treats the bucket as a path segment.
        let mut base = Url::parse(&config.public_base_url)?;
        {
            let mut segments = base
                .path_segments_mut()
                .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments.pop_if_empty();
            segments.push(&config.bucket);
            segments.push("");
        }
        Ok(Self { base })
    }

    /// Public URL for a stored image path, or `None` when the product has no
    /// image.
    #[must_use]
    pub fn resolve(&self, image_path: Option<&str>) -> Option<String> {
        let path = image_path?;
        let trimmed = path.trim_start_matches('/');
        match self.base.join(trimmed) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::warn!(image_path = path, error = %e, "unresolvable image path");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ImageResolver {
        ImageResolver::new(&MediaConfig {
            public_base_url: "https://media.orchard.test".to_string(),
            bucket: "products".to_string(),
        })
        .expect("valid base")
    }

    #[test]
    fn resolves_relative_path_under_bucket() {
        assert_eq!(
            resolver().resolve(Some("m1/front.jpg")),
            Some("https://media.orchard.test/products/m1/front.jpg".to_string())
        );
    }

    #[test]
    fn strips_leading_slash() {
        assert_eq!(
            resolver().resolve(Some("/m1.jpg")),
            Some("https://media.orchard.test/products/m1.jpg".to_string())
        );
    }

    #[test]
    fn missing_path_resolves_to_none() {
        assert_eq!(resolver().resolve(None), None);
    }
}
