use url::Url;

const PUBLIC_OBJECT_PREFIX: [&str; 4] = ["storage", "v1", "object", "public"];

/// Resolves stored document paths to publicly readable URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUrls {
	base: Url,
	bucket: String,
}

impl StorageUrls {
	pub fn new(base_url: &str, bucket: impl Into<String>) -> Result<Self, url::ParseError> {
		Ok(Self {
			base: Url::parse(base_url)?,
			bucket: bucket.into(),
		})
	}

	/// Public URL for `path`. Each path segment is percent-encoded.
	#[must_use]
	pub fn public_url(&self, path: &str) -> Url {
		let mut url = self.base.clone();
		if let Ok(mut segments) = url.path_segments_mut() {
			segments
				.pop_if_empty()
				.extend(PUBLIC_OBJECT_PREFIX)
				.push(&self.bucket)
				.extend(path.split('/').filter(|segment| !segment.is_empty()));
		}
		url
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builds_public_object_url() {
		let storage = StorageUrls::new("https://example.supabase.co/", "translations").unwrap();
		let url = storage.public_url("source/WS001 heart.pdf");
		assert_eq!(
			url.as_str(),
			"https://example.supabase.co/storage/v1/object/public/translations/source/WS001%20heart.pdf"
		);
	}

	#[test]
	fn rejects_relative_base() {
		assert!(StorageUrls::new("not a url", "bucket").is_err());
	}
}
