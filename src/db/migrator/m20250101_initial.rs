use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchRecords::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SearchRecords::SearchTerm).string().not_null())
                    .col(ColumnDef::new(SearchRecords::CreatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_search_records_created_at")
                    .table(SearchRecords::Table)
                    .col(SearchRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PodcastResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PodcastResults::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PodcastResults::SearchRecordId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PodcastResults::SearchTerm).string().not_null())
                    .col(
                        ColumnDef::new(PodcastResults::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PodcastResults::CollectionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PodcastResults::TrackId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PodcastResults::ArtistName).string().not_null())
                    .col(
                        ColumnDef::new(PodcastResults::CollectionName)
                            .string()
                            .not_null(),
                    )
                    .col(string_col(PodcastResults::TrackName))
                    .col(string_col(PodcastResults::CollectionViewUrl))
                    .col(string_col(PodcastResults::FeedUrl))
                    .col(string_col(PodcastResults::ArtworkUrl30))
                    .col(string_col(PodcastResults::ArtworkUrl60))
                    .col(string_col(PodcastResults::ArtworkUrl100))
                    .col(string_col(PodcastResults::ArtworkUrl600))
                    .col(
                        ColumnDef::new(PodcastResults::CollectionPrice)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(PodcastResults::TrackPrice)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(string_col(PodcastResults::ReleaseDate))
                    .col(string_col(PodcastResults::CollectionExplicitness))
                    .col(string_col(PodcastResults::TrackExplicitness))
                    .col(
                        ColumnDef::new(PodcastResults::TrackCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PodcastResults::TrackTimeMillis)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(string_col(PodcastResults::Country))
                    .col(string_col(PodcastResults::Currency))
                    .col(string_col(PodcastResults::PrimaryGenreName))
                    .col(string_col(PodcastResults::ContentAdvisoryRating))
                    .col(
                        ColumnDef::new(PodcastResults::GenreIds)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(PodcastResults::Genres)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(PodcastResults::CreatedAt).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_podcast_results_search_record_id")
                            .from(PodcastResults::Table, PodcastResults::SearchRecordId)
                            .to(SearchRecords::Table, SearchRecords::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_podcast_results_search_record_id")
                    .table(PodcastResults::Table)
                    .col(PodcastResults::SearchRecordId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_podcast_results_collection_id")
                    .table(PodcastResults::Table)
                    .col(PodcastResults::CollectionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PodcastResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SearchRecords::Table).to_owned())
            .await
    }
}

fn string_col(col: PodcastResults) -> ColumnDef {
    ColumnDef::new(col)
        .string()
        .not_null()
        .default("")
        .to_owned()
}

#[derive(DeriveIden)]
enum SearchRecords {
    Table,
    Id,
    SearchTerm,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PodcastResults {
    Table,
    Id,
    SearchRecordId,
    SearchTerm,
    Position,
    CollectionId,
    TrackId,
    ArtistName,
    CollectionName,
    TrackName,
    CollectionViewUrl,
    FeedUrl,
    #[sea_orm(iden = "artwork_url30")]
    ArtworkUrl30,
    #[sea_orm(iden = "artwork_url60")]
    ArtworkUrl60,
    #[sea_orm(iden = "artwork_url100")]
    ArtworkUrl100,
    #[sea_orm(iden = "artwork_url600")]
    ArtworkUrl600,
    CollectionPrice,
    TrackPrice,
    ReleaseDate,
    CollectionExplicitness,
    TrackExplicitness,
    TrackCount,
    TrackTimeMillis,
    Country,
    Currency,
    PrimaryGenreName,
    ContentAdvisoryRating,
    GenreIds,
    Genres,
    CreatedAt,
}
