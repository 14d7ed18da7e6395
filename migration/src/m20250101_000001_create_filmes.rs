use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Filmes::Table)
                    .if_not_exists()
                    .col(pk_auto(Filmes::Id))
                    .col(string_len(Filmes::Nome, 50))
                    .col(string_len(Filmes::Genero, 50))
                    .col(integer(Filmes::Duracao))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Filmes::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Filmes {
    Table,
    Id,
    Nome,
    Genero,
    Duracao,
}
