use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "vehicle_type")]
pub enum VehicleType {
    #[sea_orm(string_value = "car")]
    #[serde(rename = "car")]
    Car,
    #[sea_orm(string_value = "bike")]
    #[serde(rename = "bike")]
    Bike,
    #[sea_orm(string_value = "van")]
    #[serde(rename = "van")]
    Van,
    #[sea_orm(string_value = "SUV")]
    #[serde(rename = "SUV")]
    Suv,
}

/// Derived view of booking state: `Booked` iff the vehicle has an active
/// booking. Written only by the booking lifecycle handlers, never by vehicle
/// CRUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "availability_status")]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "booked")]
    Booked,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vehicle_name: String,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    #[sea_orm(unique)]
    pub registration_number: String,
    pub daily_rent_price: i32,
    pub availability_status: AvailabilityStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
