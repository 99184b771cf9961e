use aws_sdk_s3::Client;
use aws_smithy_types::byte_stream::ByteStream;
use tracing::info;

use crate::error::StorageError;

/// Put an object to S3. Returns the new ETag.
pub async fn put_object(
    client: &Client,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    content_type: Option<&str>,
) -> Result<String, StorageError> {
    let size = body.len();
    let mut req = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body));

    if let Some(ct) = content_type {
        req = req.content_type(ct);
    }

    let resp = req
        .send()
        .await
        .map_err(|e| StorageError::PutObject(e.into_service_error().to_string()))?;

    info!(bucket, key, size, "uploaded object");
    Ok(resp.e_tag().unwrap_or_default().to_string())
}
