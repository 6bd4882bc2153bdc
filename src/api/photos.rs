use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;

use axum::body::Body;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info, warn};
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use super::auth::is_admin;
use super::error::ApiError;
use crate::models::photos::{
    count_photos, delete_photo, find_photo, insert_photo, list_photo_ids, ImageMeta, PhotoIds,
    PhotoMetadata,
};
use crate::services::photo_store::{PendingUpload, PhotoStoreError};
use crate::state::ApiState;

pub const MAX_METADATA_BYTES: usize = 25 << 10;
pub const MAX_IMAGE_BYTES: usize = 50 << 20;
/// Whole multipart request: both parts plus boundaries and part headers.
pub const MAX_REQUEST_BYTES: usize = MAX_IMAGE_BYTES + MAX_METADATA_BYTES + (64 << 10);

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 20;
const DELETE_ATTEMPTS: usize = 11;

/// Validated query of `GET /api/v1/photos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: i64,
    pub offset: i64,
    pub with_entries: bool,
}

impl ListQuery {
    pub fn parse(params: &HashMap<String, String>) -> Result<Self, ApiError> {
        let number = |key: &str| -> Result<Option<i64>, ApiError> {
            params
                .get(key)
                .map(|raw| {
                    raw.parse::<i64>().map_err(|e| {
                        warn!("Unparseable {key}={raw}: {e}");
                        ApiError::bad_request(format!("{key} must be an integer"))
                    })
                })
                .transpose()
        };

        let limit = number("limit")?.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            warn!("limit out of bounds: {limit}");
            return Err(ApiError::bad_request(format!("limit must be between 1 and {MAX_LIMIT}")));
        }

        let offset = number("offset")?.unwrap_or(0);
        if offset < 0 {
            warn!("offset out of bounds: {offset}");
            return Err(ApiError::bad_request("offset must not be negative"));
        }

        let with_entries = match number("entries")? {
            None => false,
            Some(1) => true,
            Some(_) => return Err(ApiError::bad_request("entries must be 1")),
        };

        Ok(Self {
            limit,
            offset,
            with_entries,
        })
    }
}

/// `type/subtype` without parameters.
fn media_type(value: &str) -> &str {
    value.split(';').next().unwrap_or_default().trim()
}

fn parse_photo_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::bad_request(format!("Unable to parse photo uuid from {raw}, wrong endpoint?"))
    })
}

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::bad_request(e.body_text())
}

fn validate_metadata(metadata: &PhotoMetadata) -> Result<(), ApiError> {
    if metadata.title.trim().is_empty() {
        return Err(ApiError::bad_request("Title Required"));
    }
    if metadata.title.chars().any(char::is_control) {
        return Err(ApiError::bad_request("Title must not contain control characters"));
    }
    Ok(())
}

/// Rows stored before titles were validated may still hold quotes or
/// control characters; those are dropped from the filename.
fn attachment_disposition(title: &str) -> Result<HeaderValue, ApiError> {
    let filename: String = title
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | '\\'))
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(ApiError::internal)
}

/// Runs `op` up to `attempts` times, stopping at the first success.
async fn retry<T, E, F, Fut>(attempts: usize, what: &str, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                error!("[SEVERE] {attempt}/{attempts} {what}: {e}");
                if attempt >= attempts {
                    return Err(e);
                }
            }
        }
        attempt += 1;
    }
}

/// `GET /api/v1/photos`
pub async fn list(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<PhotoIds>, ApiError> {
    let query = ListQuery::parse(&params)?;
    let mut conn = state.pool.get().await.map_err(ApiError::internal)?;

    let ids = list_photo_ids(&mut conn, query.limit, query.offset)
        .await
        .map_err(ApiError::internal)?;

    let mut entries = -1;
    if query.with_entries {
        let total = count_photos(&mut conn).await.map_err(ApiError::internal)?;
        if query.offset >= total {
            return Err(ApiError::bad_request(
                "offset greater than or equal to total entry length",
            ));
        }
        entries = total;
    }

    Ok(Json(PhotoIds { ids, entries }))
}

/// `GET /api/v1/photos/{photo_id}`
pub async fn fetch(
    State(state): State<ApiState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let photo_id = parse_photo_id(&raw_id)?;
    let mut conn = state.pool.get().await.map_err(ApiError::internal)?;

    let Some(meta) = find_photo(&mut conn, photo_id)
        .await
        .map_err(ApiError::internal)?
    else {
        info!("No image with uuid {photo_id}");
        return Err(ApiError::bad_request(format!("No image with uuid {photo_id}")));
    };

    let file = state.photos.open(photo_id).await.map_err(|e| {
        ApiError::internal(format!("Image {photo_id} has metadata but no file: {e}"))
    })?;

    let disposition = attachment_disposition(&meta.image_name)?;
    let content_type = HeaderValue::from_str(&meta.image_type).map_err(ApiError::internal)?;

    info!("Serving {photo_id} ({})", meta.image_name);
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

async fn read_metadata(multipart: &mut Multipart) -> Result<PhotoMetadata, ApiError> {
    let mut field = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
        .ok_or_else(|| ApiError::bad_request("Unable to Process form parts"))?;

    let content_type = field.content_type().map(media_type).unwrap_or_default();
    if content_type != "application/json" {
        return Err(ApiError::bad_request(format!(
            "No Json Content found header {content_type}"
        )));
    }

    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > MAX_METADATA_BYTES {
            return Err(ApiError::bad_request(
                "Data read failed check to ensure your json file doesn't exceed 25kbs",
            ));
        }
        data.extend_from_slice(&chunk);
    }

    let metadata: PhotoMetadata =
        serde_json::from_slice(&data).map_err(|_| ApiError::bad_request("Invalid JSON"))?;
    validate_metadata(&metadata)?;

    Ok(metadata)
}

async fn stream_image(field: &mut Field<'_>, upload: &mut PendingUpload) -> Result<(), ApiError> {
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        upload
            .write_chunk(&chunk)
            .await
            .map_err(|e| match e {
                PhotoStoreError::TooLarge { .. } => ApiError::bad_request(e.to_string()),
                other => ApiError::internal(other),
            })?;
    }
    Ok(())
}

/// `PUT /api/v1/photos`: multipart with a JSON metadata part, then the image.
pub async fn upload(State(state): State<ApiState>, request: Request) -> Result<StatusCode, ApiError> {
    if !is_admin(request.headers(), &state.config) {
        return Err(ApiError::Unauthorized);
    }

    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| media_type(value).eq_ignore_ascii_case("multipart/form-data"));
    if !is_multipart {
        return Err(ApiError::UnsupportedMediaType);
    }

    let mut multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?;

    let metadata = read_metadata(&mut multipart).await?;

    let mut field = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
        .ok_or_else(|| ApiError::bad_request("Unable to Process form parts"))?;

    let image_type = field.content_type().map(media_type).unwrap_or_default().to_string();
    if !image_type.starts_with("image/") {
        return Err(ApiError::bad_request("Content Type Not Image"));
    }

    let mut pending = state
        .photos
        .begin_upload(MAX_IMAGE_BYTES)
        .await
        .map_err(ApiError::internal)?;
    if let Err(e) = stream_image(&mut field, &mut pending).await {
        pending.abort().await;
        return Err(e);
    }

    let photo_id = Uuid::new_v4();
    let meta = ImageMeta::from_upload(photo_id, &metadata, &image_type);

    let mut conn = match state.pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            pending.abort().await;
            return Err(ApiError::internal(e));
        }
    };
    if let Err(e) = insert_photo(&mut conn, &meta, &metadata.tags).await {
        pending.abort().await;
        return Err(ApiError::internal(e));
    }

    if let Err(e) = pending.commit(&state.photos, photo_id).await {
        error!("[SEVERE] Stored metadata for {photo_id} but not its image: {e}");
        if let Err(e) = delete_photo(&mut conn, photo_id).await {
            error!("[SEVERE] Orphaned metadata for {photo_id}, manual removal required: {e}");
        }
        return Err(ApiError::internal(e));
    }

    info!("Uploaded image {} as {photo_id}", metadata.title);
    Ok(StatusCode::OK)
}

/// `DELETE /api/v1/photos/{photo_id}`
pub async fn remove(
    State(state): State<ApiState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    if !is_admin(&headers, &state.config) {
        return Err(ApiError::Unauthorized);
    }

    let photo_id = parse_photo_id(&raw_id)?;
    state
        .photos
        .remove(photo_id)
        .await
        .map_err(ApiError::internal)?;

    // fresh connection per attempt
    let pool = &state.pool;
    let what = format!("couldn't remove image {photo_id} from the database");
    let deleted = retry(DELETE_ATTEMPTS, &what, || async move {
        let mut conn = pool.get().await.map_err(|e| e.to_string())?;
        delete_photo(&mut conn, photo_id).await.map_err(|e| e.to_string())
    })
    .await;

    match deleted {
        Ok(_) => {
            info!("Deleted image {photo_id}");
            Ok(StatusCode::OK)
        }
        Err(_) => Err(ApiError::internal(format!(
            "unable to delete {photo_id} from the database, manual removal IS REQUIRED"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListQuery::parse(&params(&[])).unwrap();
        assert_eq!(
            query,
            ListQuery {
                limit: 20,
                offset: 0,
                with_entries: false
            }
        );
    }

    #[test]
    fn test_list_query_bounds() {
        assert!(ListQuery::parse(&params(&[("limit", "0")])).is_err());
        assert!(ListQuery::parse(&params(&[("limit", "21")])).is_err());
        assert!(ListQuery::parse(&params(&[("limit", "ten")])).is_err());
        assert!(ListQuery::parse(&params(&[("offset", "-1")])).is_err());
        assert!(ListQuery::parse(&params(&[("entries", "2")])).is_err());

        let query = ListQuery::parse(&params(&[("limit", "5"), ("offset", "10"), ("entries", "1")])).unwrap();
        assert_eq!(query.limit, 5);
        assert_eq!(query.offset, 10);
        assert!(query.with_entries);
    }

    #[test]
    fn test_media_type_strips_parameters() {
        assert_eq!(media_type("multipart/form-data; boundary=xyz"), "multipart/form-data");
        assert_eq!(media_type("application/json"), "application/json");
    }

    #[test]
    fn test_photo_id_errors_mention_input() {
        let err = parse_photo_id("not-a-uuid").unwrap_err();
        assert!(err.to_string().contains("not-a-uuid"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    fn titled(title: &str) -> PhotoMetadata {
        PhotoMetadata {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_titles_with_control_characters_are_rejected() {
        assert!(validate_metadata(&titled("Dunes")).is_ok());
        assert!(validate_metadata(&titled("Café at dusk")).is_ok());

        let err = validate_metadata(&titled("Sunset\nBeach")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(validate_metadata(&titled("tab\there")).is_err());
        assert!(validate_metadata(&titled("   ")).is_err());
    }

    #[test]
    fn test_disposition_survives_any_stored_title() {
        let value = attachment_disposition("Sunset\nBeach").unwrap();
        assert_eq!(value, "attachment; filename=\"SunsetBeach\"");

        let value = attachment_disposition(r#"a "quoted" \name"#).unwrap();
        assert_eq!(value, "attachment; filename=\"a quoted name\"");

        assert!(attachment_disposition("Café at dusk").is_ok());
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_all_attempts() {
        let calls = std::cell::Cell::new(0);
        let result: Result<(), String> = retry(DELETE_ATTEMPTS, "delete", || {
            calls.set(calls.get() + 1);
            async { Err("connection reset".to_string()) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "connection reset");
        assert_eq!(calls.get(), 11);
    }

    #[tokio::test]
    async fn test_retry_stops_at_first_success() {
        let calls = std::cell::Cell::new(0);
        let result = retry(DELETE_ATTEMPTS, "delete", || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 3 {
                    Err(format!("attempt {attempt} failed"))
                } else {
                    Ok(1usize)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(1));
        assert_eq!(calls.get(), 3);
    }
}
