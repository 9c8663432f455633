use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct Colgado {
    pub id: i64,
    pub part_key: i64,
    pub part_no: String,
    pub pieza_rack: i64,
    pub rack_eslabon: i64,
}

/// A Colgado that has not been stored yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewColgado {
    pub part_key: i64,
    pub part_no: String,
    pub pieza_rack: i64,
    pub rack_eslabon: i64,
}

/// The only two fields that may change after a Colgado is created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RackCounts {
    pub pieza_rack: i64,
    pub rack_eslabon: i64,
}

impl NewColgado {
    pub fn into_colgado(self, id: i64) -> Colgado {
        Colgado {
            id,
            part_key: self.part_key,
            part_no: self.part_no,
            pieza_rack: self.pieza_rack,
            rack_eslabon: self.rack_eslabon,
        }
    }
}
