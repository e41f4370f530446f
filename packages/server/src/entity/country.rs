use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One visited country in the collection.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "country")]
pub struct Model {
    /// Never reused: SQLite assigns it with AUTOINCREMENT.
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Stored as entered (trimmed); escaping is the renderer's job.
    pub name: String,
    /// Generated filename inside the content directory.
    pub image_path: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
