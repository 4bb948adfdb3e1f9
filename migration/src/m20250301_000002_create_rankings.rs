// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

/// 排名历史记录表迁移
///
/// rankings 表只插入，排名历史是日志而非可变行。
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rankings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Rankings::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Rankings::KeywordId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rankings::Position).integer().null())
                    .col(ColumnDef::new(Rankings::FoundUrl).string().null())
                    .col(
                        ColumnDef::new(Rankings::TotalResults)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Rankings::CheckedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 历史查询按 (keyword_id, checked_at) 倒序读取
        manager
            .create_index(
                Index::create()
                    .name("idx_rankings_keyword_checked")
                    .table(Rankings::Table)
                    .col(Rankings::KeywordId)
                    .col(Rankings::CheckedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rankings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Rankings {
    Table,
    Id,
    KeywordId,
    Position,
    FoundUrl,
    TotalResults,
    CheckedAt,
}
