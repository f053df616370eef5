use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OauthBind::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OauthBind::Addr)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OauthBind::Github).string_len(255))
                    .col(ColumnDef::new(OauthBind::GithubName).string_len(255))
                    .col(ColumnDef::new(OauthBind::Discord).string_len(64))
                    .col(ColumnDef::new(OauthBind::DiscordName).string_len(255))
                    .col(ColumnDef::new(OauthBind::Gmail).string_len(320))
                    .col(ColumnDef::new(OauthBind::Stackexchange).string_len(64))
                    .col(ColumnDef::new(OauthBind::StackexchangeName).string_len(255))
                    .col(
                        ColumnDef::new(OauthBind::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(OauthBind::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个平台账号最多绑定一个地址，NULL 不参与唯一约束
        manager
            .create_index(
                Index::create()
                    .name("uk_oauth_bind_github")
                    .table(OauthBind::Table)
                    .col(OauthBind::Github)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_oauth_bind_discord")
                    .table(OauthBind::Table)
                    .col(OauthBind::Discord)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_oauth_bind_gmail")
                    .table(OauthBind::Table)
                    .col(OauthBind::Gmail)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uk_oauth_bind_stackexchange")
                    .table(OauthBind::Table)
                    .col(OauthBind::Stackexchange)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OauthBind::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OauthBind {
    Table,
    Addr,
    Github,
    GithubName,
    Discord,
    DiscordName,
    Gmail,
    Stackexchange,
    StackexchangeName,
    CreatedAt,
    UpdatedAt,
}
