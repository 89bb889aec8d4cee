pub const ALLOWED_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// A single image received over `/upload`, alive only for the store write.
#[derive(Debug)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

pub fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES.contains(&content_type)
}

/// Reference handed to the inference service, e.g. `gs://bucket/file`.
pub fn object_uri(scheme: &str, bucket: &str, file_name: &str) -> String {
    format!("{}://{}/{}", scheme, bucket, file_name)
}
