use std::collections::HashMap;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing, Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};

use atelier_blob::{Category, ChunkResult, ChunkUpload};

use crate::{AtelierAxumError, AtelierState};

/// Build the media router.
///
/// The chunk endpoint takes multipart/form-data with the chunk as a binary
/// part and the transfer fields as text parts, the shape a browser-side
/// uploader produces.
pub fn media_router(state: AtelierState) -> Router<()> {
    // Chunks are bounded, so the body cap only needs headroom for one
    // chunk plus its form framing
    let body_limit = state.adapter.config().chunk_size * 2;

    Router::new()
        .route("/media/chunks", routing::post(upload_chunk))
        .route("/media", routing::get(list_media))
        .route("/media/{id}", routing::delete(delete_media))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn upload_chunk(
    State(state): State<AtelierState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AtelierAxumError> {
    let mut chunk: Option<Bytes> = None;
    let mut chunk_content_type: Option<String> = None;
    let mut fields: HashMap<String, String> = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AtelierAxumError::bad_request(format!("Failed to parse multipart data: {e}"))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "chunk" {
            chunk_content_type = field.content_type().map(|ct| ct.to_string());
            chunk = Some(field.bytes().await.map_err(|e| {
                AtelierAxumError::bad_request(format!("Failed to read chunk field: {e}"))
            })?);
        } else {
            let value = field.text().await.map_err(|e| {
                AtelierAxumError::bad_request(format!("Failed to read field '{name}': {e}"))
            })?;
            fields.insert(name, value);
        }
    }

    let chunk = chunk.ok_or_else(|| AtelierAxumError::bad_request("Missing required field: chunk"))?;
    let chunk_index = parse_u32(&fields, "chunkIndex")?;
    let total_chunks = parse_u32(&fields, "totalChunks")?;

    let mut upload = ChunkUpload::new(
        fields.remove("fileId").unwrap_or_default(),
        chunk_index,
        total_chunks,
        fields.remove("originalName").unwrap_or_default(),
        fields.remove("category").unwrap_or_default(),
        chunk,
    );
    if let Some(name) = fields.remove("name") {
        upload = upload.with_name(name);
    }
    if let Some(subtitle) = fields.remove("subtitle") {
        upload = upload.with_subtitle(subtitle);
    }
    if let Some(content_type) = fields.remove("contentType").or(chunk_content_type) {
        upload = upload.with_content_type(content_type);
    }

    match state.adapter.upload_chunk(upload).await? {
        ChunkResult::Partial {
            chunk_index,
            total_chunks,
        } => Ok(Json(json!({
            "success": true,
            "complete": false,
            "chunkIndex": chunk_index,
            "totalChunks": total_chunks,
        }))),
        ChunkResult::Complete { media } => Ok(Json(json!({
            "success": true,
            "complete": true,
            "media": media,
        }))),
    }
}

#[derive(Debug, Deserialize)]
struct ListMediaQuery {
    category: Option<String>,
}

async fn list_media(
    State(state): State<AtelierState>,
    Query(query): Query<ListMediaQuery>,
) -> Result<Json<Value>, AtelierAxumError> {
    let category = match query.category.as_deref() {
        Some(raw) => Some(Category::parse(raw)?),
        None => None,
    };

    let items = state.adapter.list_media(category).await?;
    Ok(Json(json!({
        "success": true,
        "count": items.len(),
        "media": items,
    })))
}

async fn delete_media(
    State(state): State<AtelierState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AtelierAxumError> {
    state.adapter.delete_media(&id).await?;
    Ok(Json(json!({ "success": true, "deleted": id })))
}

fn parse_u32(fields: &HashMap<String, String>, key: &str) -> Result<u32, AtelierAxumError> {
    let raw = fields
        .get(key)
        .ok_or_else(|| AtelierAxumError::bad_request(format!("Missing required field: {key}")))?;
    raw.parse()
        .map_err(|_| AtelierAxumError::bad_request(format!("Field {key} must be an integer")))
}
