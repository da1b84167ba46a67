//! Reference data (barbers, services, packages, clients)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Barber {
    pub id: i32,
    pub name: String,
    pub active: bool,
}

/// A bookable service (haircut, shave, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Service {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub active: bool,
}

/// A bundle of services sold as one booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Package {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub duration_minutes: i32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub phone: String,
    pub active: bool,
}

/// Active reference lists loaded at submission time
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ReferenceSnapshot {
    pub barbers: Vec<Barber>,
    pub services: Vec<Service>,
    pub packages: Vec<Package>,
    pub clients: Vec<Client>,
}

impl ReferenceSnapshot {
    pub fn barber(&self, id: i32) -> Option<&Barber> {
        self.barbers.iter().find(|b| b.id == id)
    }

    pub fn service(&self, id: i32) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn package(&self, id: i32) -> Option<&Package> {
        self.packages.iter().find(|p| p.id == id)
    }

    pub fn client(&self, id: i32) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }
}
