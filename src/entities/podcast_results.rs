use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "podcast_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub search_record_id: String,
    pub search_term: String,
    /// Order of the item in the catalog response
    pub position: i32,
    pub collection_id: i64,
    pub track_id: i64,
    pub artist_name: String,
    pub collection_name: String,
    pub track_name: String,
    pub collection_view_url: String,
    pub feed_url: String,
    pub artwork_url30: String,
    pub artwork_url60: String,
    pub artwork_url100: String,
    pub artwork_url600: String,
    pub collection_price: f64,
    pub track_price: f64,
    pub release_date: String,
    pub collection_explicitness: String,
    pub track_explicitness: String,
    pub track_count: i32,
    pub track_time_millis: i64,
    pub country: String,
    pub currency: String,
    pub primary_genre_name: String,
    pub content_advisory_rating: String,
    /// JSON array of strings
    #[sea_orm(column_type = "Text")]
    pub genre_ids: String,
    /// JSON array of strings
    #[sea_orm(column_type = "Text")]
    pub genres: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::search_records::Entity",
        from = "Column::SearchRecordId",
        to = "super::search_records::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    SearchRecord,
}

impl Related<super::search_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SearchRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
