//! Uniqueness constraints for budget rows and their mirrored transactions.
//!
//! - one budget row per (user, year, month, category, kind, account)
//! - at most one transaction per budget row

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Budgets {
    Table,
    UserId,
    Year,
    Month,
    CategoryName,
    Kind,
    AccountId,
}

#[derive(Iden)]
enum Transactions {
    Table,
    BudgetId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-key")
                    .table(Budgets::Table)
                    .col(Budgets::UserId)
                    .col(Budgets::Year)
                    .col(Budgets::Month)
                    .col(Budgets::CategoryName)
                    .col(Budgets::Kind)
                    .col(Budgets::AccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-budget_id")
                    .table(Transactions::Table)
                    .col(Transactions::BudgetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-transactions-budget_id")
                    .table(Transactions::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx-budgets-key")
                    .table(Budgets::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
