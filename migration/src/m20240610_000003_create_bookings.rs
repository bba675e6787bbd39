use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20240610_000001_create_users::User;
use super::m20240610_000002_create_vehicles::Vehicle;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(BookingStatus::Enum)
                    .values([
                        BookingStatus::Active,
                        BookingStatus::Cancelled,
                        BookingStatus::Returned,
                    ])
                    .to_owned(),
            )
            .await?;

        manager.create_table(booking_table()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(BookingStatus::Enum).to_owned())
            .await
    }
}

// Deleting a customer or vehicle cascades to its booking rows. The handlers
// block deletion while any booking is still `active`; terminal rows must not
// keep the parent alive.
fn booking_table() -> TableCreateStatement {
    Table::create()
        .table(Booking::Table)
        .if_not_exists()
        .col(uuid(Booking::Id).primary_key())
        .col(uuid(Booking::CustomerId).not_null())
        .col(uuid(Booking::VehicleId).not_null())
        .col(date(Booking::RentStartDate).not_null())
        .col(date(Booking::RentEndDate).not_null())
        .col(big_integer(Booking::TotalPrice).not_null())
        .col(
            ColumnDef::new(Booking::Status)
                .custom(BookingStatus::Enum)
                .not_null(),
        )
        .col(
            timestamp_with_time_zone(Booking::CreatedAt)
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_booking_customer")
                .from(Booking::Table, Booking::CustomerId)
                .to(User::Table, User::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_booking_vehicle")
                .from(Booking::Table, Booking::VehicleId)
                .to(Vehicle::Table, Vehicle::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    CustomerId,
    VehicleId,
    RentStartDate,
    RentEndDate,
    TotalPrice,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum BookingStatus {
    #[sea_orm(iden = "booking_status")]
    Enum,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
    #[sea_orm(iden = "returned")]
    Returned,
}

#[cfg(test)]
mod tests {
    use sea_orm_migration::sea_orm::sea_query::PostgresQueryBuilder;

    use super::*;

    #[test]
    fn test_terminal_bookings_do_not_block_parent_deletes() {
        // Deleting a user or vehicle whose bookings are all cancelled or
        // returned must succeed; only the handlers' active-booking check may
        // refuse it. Both FKs therefore cascade rather than restrict.
        let sql = booking_table().to_string(PostgresQueryBuilder);
        assert_eq!(sql.matches("ON DELETE CASCADE").count(), 2);
        assert!(!sql.contains("ON DELETE RESTRICT"));
    }
}
