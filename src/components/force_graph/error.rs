/// Failures fetching or decoding the graph payload. These end the load in `Failed`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
	#[error("network error: {0}")]
	Network(String),

	#[error("network response was not ok: {code} {text}")]
	Status { code: u16, text: String },

	#[error("malformed graph payload: {0}")]
	Decode(String),
}

/// Failures loading a single node image. Logged and absorbed by the cache.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImageError {
	#[error("failed to create image element: {0}")]
	Create(String),

	#[error("failed to load image {src}")]
	Load { src: String },
}
