use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::db::{NewColgado, RackCounts};

pub const REQUIRED: &str = "Este campo es obligatorio.";
pub const NOT_AN_INTEGER: &str = "No es un numero entero valido.";
pub const TOO_LONG: &str = "No puede tener mas de 250 caracteres.";
pub const BAD_CSRF: &str = "El formulario expiro, intente de nuevo.";
pub const PART_NO_MAX_LEN: usize = 250;

pub const ADD_FIELDS: &[&str] = &["part_key", "part_no", "pieza_rack", "rack_eslabon"];
pub const EDIT_FIELDS: &[&str] = &["pieza_rack", "rack_eslabon"];

/// Messages per field name, in a stable order for rendering.
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

/// `errors` with an entry (possibly empty) for every field the template shows.
pub fn errors_for_template(fields: &[&'static str], mut errors: FieldErrors) -> FieldErrors {
    for field in fields {
        errors.entry(*field).or_default();
    }
    errors
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

impl RegisterForm {
    /// Trimmed email and name; `None` if any field is blank.
    pub fn normalized(self) -> Option<Self> {
        let email = self.email.trim().to_string();
        let name = self.name.trim().to_string();
        if email.is_empty() || name.is_empty() || self.password.is_empty() {
            return None;
        }
        Some(Self {
            email,
            password: self.password,
            name,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Raw values of the "add Colgado" form, kept as submitted so a rejected
/// form can be shown again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddForm {
    #[serde(default)]
    pub part_key: String,
    #[serde(default)]
    pub part_no: String,
    #[serde(default)]
    pub pieza_rack: String,
    #[serde(default)]
    pub rack_eslabon: String,
    #[serde(default, skip_serializing)]
    pub csrf_token: String,
}

impl AddForm {
    pub fn validate(&self) -> Result<NewColgado, FieldErrors> {
        let mut errors = FieldErrors::new();
        let part_key = integer_field("part_key", &self.part_key, &mut errors);
        let part_no = text_field("part_no", &self.part_no, PART_NO_MAX_LEN, &mut errors);
        let pieza_rack = integer_field("pieza_rack", &self.pieza_rack, &mut errors);
        let rack_eslabon = integer_field("rack_eslabon", &self.rack_eslabon, &mut errors);

        match (part_key, part_no, pieza_rack, rack_eslabon) {
            (Some(part_key), Some(part_no), Some(pieza_rack), Some(rack_eslabon))
                if errors.is_empty() =>
            {
                Ok(NewColgado {
                    part_key,
                    part_no,
                    pieza_rack,
                    rack_eslabon,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Body of `POST /edit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditForm {
    pub id: i64,
    #[serde(default)]
    pub pieza_rack: String,
    #[serde(default)]
    pub rack_eslabon: String,
}

impl EditForm {
    pub fn validate(&self) -> Result<RackCounts, FieldErrors> {
        let mut errors = FieldErrors::new();
        let pieza_rack = integer_field("pieza_rack", &self.pieza_rack, &mut errors);
        let rack_eslabon = integer_field("rack_eslabon", &self.rack_eslabon, &mut errors);
        match (pieza_rack, rack_eslabon) {
            (Some(pieza_rack), Some(rack_eslabon)) => Ok(RackCounts {
                pieza_rack,
                rack_eslabon,
            }),
            _ => Err(errors),
        }
    }
}

fn integer_field(name: &'static str, raw: &str, errors: &mut FieldErrors) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.entry(name).or_default().push(REQUIRED.to_string());
        return None;
    }
    match raw.parse::<i64>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors
                .entry(name)
                .or_default()
                .push(NOT_AN_INTEGER.to_string());
            None
        }
    }
}

fn text_field(
    name: &'static str,
    raw: &str,
    max_len: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.entry(name).or_default().push(REQUIRED.to_string());
        return None;
    }
    if raw.chars().count() > max_len {
        errors.entry(name).or_default().push(TOO_LONG.to_string());
        return None;
    }
    Some(raw.to_string())
}
