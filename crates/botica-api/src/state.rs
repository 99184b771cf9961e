use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use botica_bedrock::recommend::RecommendationClient;
use botica_storage::store::RecommendationStore;

/// Where exported documents are uploaded.
#[derive(Clone)]
pub struct ExportTarget {
    pub s3: S3Client,
    pub bucket: String,
}

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub store: RecommendationStore,
    pub recommender: Arc<RecommendationClient>,
    pub exports: Option<ExportTarget>,
}
