use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(VehicleType::Enum)
                    .values([
                        VehicleType::Car,
                        VehicleType::Bike,
                        VehicleType::Van,
                        VehicleType::Suv,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(AvailabilityStatus::Enum)
                    .values([AvailabilityStatus::Available, AvailabilityStatus::Booked])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(uuid(Vehicle::Id).primary_key())
                    .col(string_len(Vehicle::VehicleName, 100).not_null())
                    .col(
                        ColumnDef::new(Vehicle::Type)
                            .custom(VehicleType::Enum)
                            .not_null(),
                    )
                    .col(
                        string_len(Vehicle::RegistrationNumber, 50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(integer(Vehicle::DailyRentPrice).not_null())
                    .col(
                        ColumnDef::new(Vehicle::AvailabilityStatus)
                            .custom(AvailabilityStatus::Enum)
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(Vehicle::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(AvailabilityStatus::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(VehicleType::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vehicle {
    Table,
    Id,
    VehicleName,
    Type,
    RegistrationNumber,
    DailyRentPrice,
    AvailabilityStatus,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum VehicleType {
    #[sea_orm(iden = "vehicle_type")]
    Enum,
    #[sea_orm(iden = "car")]
    Car,
    #[sea_orm(iden = "bike")]
    Bike,
    #[sea_orm(iden = "van")]
    Van,
    #[sea_orm(iden = "SUV")]
    Suv,
}

#[derive(DeriveIden)]
pub enum AvailabilityStatus {
    #[sea_orm(iden = "availability_status")]
    Enum,
    #[sea_orm(iden = "available")]
    Available,
    #[sea_orm(iden = "booked")]
    Booked,
}
