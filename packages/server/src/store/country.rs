use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, QueryOrder, Set};

use crate::entity::country;

/// Column changes for an in-place update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryChanges {
    pub name: Option<String>,
    pub image_path: Option<String>,
}

impl CountryChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image_path.is_none()
    }
}

/// Record store for collection entries.
///
/// Row writes are independent of image files; callers pair them with the image
/// store and accept eventual consistency between the two.
pub struct CountryStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> CountryStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// All entries, newest first.
    pub async fn list(&self) -> Result<Vec<country::Model>, DbErr> {
        country::Entity::find()
            .order_by_desc(country::Column::CreatedAt)
            .order_by_desc(country::Column::Id)
            .all(self.conn)
            .await
    }

    pub async fn insert(&self, name: &str, image_path: &str) -> Result<country::Model, DbErr> {
        country::ActiveModel {
            name: Set(name.to_string()),
            image_path: Set(image_path.to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.conn)
        .await
    }

    pub async fn get(&self, id: i32) -> Result<Option<country::Model>, DbErr> {
        country::Entity::find_by_id(id).one(self.conn).await
    }

    pub async fn update_name(
        &self,
        id: i32,
        name: &str,
    ) -> Result<Option<country::Model>, DbErr> {
        self.update(
            id,
            CountryChanges {
                name: Some(name.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn update_image(
        &self,
        id: i32,
        image_path: &str,
    ) -> Result<Option<country::Model>, DbErr> {
        self.update(
            id,
            CountryChanges {
                image_path: Some(image_path.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    /// Apply `changes` to an existing row. Returns `None` if `id` is absent.
    pub async fn update(
        &self,
        id: i32,
        changes: CountryChanges,
    ) -> Result<Option<country::Model>, DbErr> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };
        if changes.is_empty() {
            return Ok(Some(existing));
        }

        let mut active: country::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(image_path) = changes.image_path {
            active.image_path = Set(image_path);
        }

        Ok(Some(active.update(self.conn).await?))
    }

    /// Remove a row. Returns whether it existed.
    pub async fn delete(&self, id: i32) -> Result<bool, DbErr> {
        let result = country::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
