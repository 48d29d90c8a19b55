//! Initial catalog schema.
//!
//! - `app_entries`: cataloged apps
//! - `users`: review authors and admin staff
//! - `reviews`: per-app reviews, removed with their app or author
//! - `stores`: stores carrying apps
//! - `store_apps`: store ↔ app many-to-many join
//! - `certificates`: at most one per app, globally unique number

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Category codes accepted by `app_entries.category`.
const CATEGORY_CODES: [&str; 5] = ["FR", "SO", "JR", "SR", "GR"];

#[derive(Iden)]
enum AppEntries {
    Table,
    Id,
    Name,
    Image,
    Category,
    DateAdded,
    Description,
    IsActive,
    PriceMinor,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    IsStaff,
}

#[derive(Iden)]
enum Reviews {
    Table,
    Id,
    AppId,
    UserId,
    ReviewText,
    Rating,
    DateAdded,
}

#[derive(Iden)]
enum Stores {
    Table,
    Id,
    Name,
    MotherCompany,
    ContactNumber,
    Email,
}

#[derive(Iden)]
enum StoreApps {
    Table,
    StoreId,
    AppId,
}

#[derive(Iden)]
enum Certificates {
    Table,
    Id,
    AppId,
    CertificateName,
    CertificateNumber,
    IssuedBy,
    IssueDate,
    ExpiryDate,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AppEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppEntries::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AppEntries::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(AppEntries::Image)
                            .string_len(255)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(AppEntries::Category)
                            .string_len(2)
                            .not_null()
                            .check(Expr::col(AppEntries::Category).is_in(CATEGORY_CODES)),
                    )
                    .col(
                        ColumnDef::new(AppEntries::DateAdded)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(AppEntries::Description).text().default(""))
                    .col(
                        ColumnDef::new(AppEntries::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AppEntries::PriceMinor)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(AppEntries::PriceMinor).gte(0)),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(150)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsStaff)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::AppId).integer().not_null())
                    .col(ColumnDef::new(Reviews::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(Reviews::ReviewText)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Reviews::Rating)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Reviews::Rating).between(0, 5)),
                    )
                    .col(
                        ColumnDef::new(Reviews::DateAdded)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reviews-app_id")
                            .from(Reviews::Table, Reviews::AppId)
                            .to(AppEntries::Table, AppEntries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reviews-user_id")
                            .from(Reviews::Table, Reviews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-reviews-app_id")
                    .table(Reviews::Table)
                    .col(Reviews::AppId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Stores::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Stores::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Stores::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Stores::MotherCompany)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Stores::ContactNumber).string_len(20))
                    .col(ColumnDef::new(Stores::Email).string_len(254))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StoreApps::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StoreApps::StoreId).integer().not_null())
                    .col(ColumnDef::new(StoreApps::AppId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(StoreApps::StoreId)
                            .col(StoreApps::AppId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-store_apps-store_id")
                            .from(StoreApps::Table, StoreApps::StoreId)
                            .to(Stores::Table, Stores::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-store_apps-app_id")
                            .from(StoreApps::Table, StoreApps::AppId)
                            .to(AppEntries::Table, AppEntries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-store_apps-app_id")
                    .table(StoreApps::Table)
                    .col(StoreApps::AppId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Certificates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Certificates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Certificates::AppId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Certificates::CertificateName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Certificates::CertificateNumber)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Certificates::IssuedBy)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Certificates::IssueDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Certificates::ExpiryDate).date())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-certificates-app_id")
                            .from(Certificates::Table, Certificates::AppId)
                            .to(AppEntries::Table, AppEntries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse creation order so foreign keys never dangle.
        manager
            .drop_table(Table::drop().table(Certificates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StoreApps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stores::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AppEntries::Table).to_owned())
            .await?;
        Ok(())
    }
}
