#![allow(dead_code)]
use sluice::{Entity, Enumeration};
use time::PrimitiveDateTime;

#[derive(Enumeration, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    #[default]
    Bronze,
    Silver,
    Gold,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Country {
    #[sluice(primary_key)]
    pub id: i64,
    pub create_date: Option<PrimitiveDateTime>,
    pub create_by: Option<String>,
    pub name: String,
    pub native_name: Option<String>,
    pub separator: Option<String>,
    pub note: Option<String>,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Audit {
    pub created_by: Option<String>,
    pub created_at: Option<PrimitiveDateTime>,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Party {
    #[sluice(primary_key)]
    pub id: i64,
    #[sluice(embedded)]
    pub audit: Audit,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[sluice(table = "customers", schema = "SALES")]
pub struct Customer {
    #[sluice(base)]
    pub party: Party,
    pub name: String,
    pub level: Level,
    #[sluice(to_one, join_column = "country_id")]
    pub country: Option<Box<Country>>,
    pub ad_position: Option<i32>,
    #[sluice(transient)]
    pub cache: String,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Currency {
    #[sluice(column = "ISO")]
    pub code: String,
    pub name: String,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Price {
    #[sluice(primary_key)]
    pub id: u32,
    pub amount: rust_decimal::Decimal,
    #[sluice(to_one, join_column = "currency", referenced = "ISO")]
    pub currency: Option<Currency>,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Digest {
    pub sha256sum: String,
    pub md5_hash_2: Option<String>,
}
