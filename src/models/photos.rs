use cfg_if::cfg_if;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The JSON part of a photo upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Response to `GET /api/v1/photos`. `entries` is -1 unless the total was asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoIds {
    pub ids: Vec<Uuid>,
    pub entries: i64,
}

cfg_if! { if #[cfg(feature = "ssr")] {
    use crate::schema::{image_meta, image_tags};
    use diesel::prelude::*;
    use diesel_async::scoped_futures::ScopedFutureExt;
    use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

    #[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
    #[diesel(table_name = image_meta)]
    pub struct ImageMeta {
        pub id: Uuid,
        pub image_name: String,
        pub image_type: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Insertable)]
    #[diesel(table_name = image_tags)]
    pub struct NewImageTag<'a> {
        pub id: Uuid,
        pub tag: &'a str,
    }

    impl ImageMeta {
        pub fn from_upload(id: Uuid, metadata: &PhotoMetadata, image_type: &str) -> Self {
            ImageMeta {
                id,
                image_name: metadata.title.clone(),
                image_type: image_type.to_string(),
                description: Some(metadata.description.clone()).filter(|d| !d.is_empty()),
            }
        }
    }

    /// Inserts the metadata row and its tags in one transaction.
    pub async fn insert_photo(
        conn: &mut AsyncPgConnection,
        meta: &ImageMeta,
        tags: &[String],
    ) -> QueryResult<()> {
        let mut unique: Vec<&str> = tags.iter().map(String::as_str).collect();
        unique.sort_unstable();
        unique.dedup();
        let rows: Vec<NewImageTag> = unique
            .into_iter()
            .map(|tag| NewImageTag { id: meta.id, tag })
            .collect();

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(image_meta::table)
                    .values(meta)
                    .execute(conn)
                    .await?;

                if !rows.is_empty() {
                    diesel::insert_into(image_tags::table)
                        .values(&rows)
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    /// Returns the number of metadata rows removed.
    pub async fn delete_photo(conn: &mut AsyncPgConnection, photo_id: Uuid) -> QueryResult<usize> {
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(image_tags::table.filter(image_tags::id.eq(photo_id)))
                    .execute(conn)
                    .await?;
                diesel::delete(image_meta::table.find(photo_id))
                    .execute(conn)
                    .await
            }
            .scope_boxed()
        })
        .await
    }

    pub async fn find_photo(conn: &mut AsyncPgConnection, photo_id: Uuid) -> QueryResult<Option<ImageMeta>> {
        image_meta::table
            .find(photo_id)
            .select(ImageMeta::as_select())
            .first(conn)
            .await
            .optional()
    }

    pub async fn list_photo_ids(conn: &mut AsyncPgConnection, limit: i64, offset: i64) -> QueryResult<Vec<Uuid>> {
        image_meta::table
            .select(image_meta::id)
            .order(image_meta::id)
            .limit(limit)
            .offset(offset)
            .load(conn)
            .await
    }

    pub async fn count_photos(conn: &mut AsyncPgConnection) -> QueryResult<i64> {
        image_meta::table.count().get_result(conn).await
    }
}}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_defaults() {
        let metadata: PhotoMetadata = serde_json::from_str(r#"{"title": "Dunes"}"#).unwrap();
        assert_eq!(metadata.title, "Dunes");
        assert!(metadata.tags.is_empty());
    }

    #[test]
    fn test_ids_wire_format() {
        let ids = PhotoIds { ids: vec![Uuid::nil()], entries: -1 };
        let json = serde_json::to_value(&ids).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ids": ["00000000-0000-0000-0000-000000000000"], "entries": -1})
        );
    }
}
