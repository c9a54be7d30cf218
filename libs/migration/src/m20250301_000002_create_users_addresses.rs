use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsersAddresses::Table)
                    .if_not_exists()
                    .col(integer(UsersAddresses::UserId))
                    .col(integer(UsersAddresses::AddressId))
                    .primary_key(
                        Index::create()
                            .col(UsersAddresses::UserId)
                            .col(UsersAddresses::AddressId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_addresses_user_id")
                            .from(UsersAddresses::Table, UsersAddresses::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_addresses_address_id")
                            .from(UsersAddresses::Table, UsersAddresses::AddressId)
                            .to(Addresses::Table, Addresses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_addresses_address_id")
                    .table(UsersAddresses::Table)
                    .col(UsersAddresses::AddressId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsersAddresses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UsersAddresses {
    Table,
    UserId,
    AddressId,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    UserId,
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
}
