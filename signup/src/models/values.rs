// Signup form values
//
// The drafts kept a loosely-typed key/value bag; here every field has a fixed name and a fixed
// value kind, and the submitted payload serializes to `{username, address, toc, pp}`.

use crate::wizard::WizardError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldName {
    Username,
    Address,
    Toc,
    Pp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Checkbox,
}

impl FieldName {
    pub const ALL: [FieldName; 4] = [
        FieldName::Username,
        FieldName::Address,
        FieldName::Toc,
        FieldName::Pp,
    ];

    /// Stable key used in the submitted payload and in logs.
    pub fn as_id(&self) -> &'static str {
        match self {
            FieldName::Username => "username",
            FieldName::Address => "address",
            FieldName::Toc => "toc",
            FieldName::Pp => "pp",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldName::Username => "Username",
            FieldName::Address => "Address",
            FieldName::Toc => "I accept the Terms and Conditions.",
            FieldName::Pp => "I accept the Privacy Policy.",
        }
    }

    /// Noun used in validation messages ("Please enter your username").
    pub fn subject(&self) -> &'static str {
        match self {
            FieldName::Username => "your username",
            FieldName::Address => "your address",
            FieldName::Toc => "Terms and Conditions",
            FieldName::Pp => "Privacy Policy",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldName::Username | FieldName::Address => FieldKind::Text,
            FieldName::Toc | FieldName::Pp => FieldKind::Checkbox,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Flag(_) => FieldKind::Checkbox,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

/// Current values of every signup field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupValues {
    pub username: String,
    pub address: String,
    pub toc: bool,
    pub pp: bool,
}

impl SignupValues {
    pub fn get(&self, field: FieldName) -> FieldValue {
        match field {
            FieldName::Username => FieldValue::Text(self.username.clone()),
            FieldName::Address => FieldValue::Text(self.address.clone()),
            FieldName::Toc => FieldValue::Flag(self.toc),
            FieldName::Pp => FieldValue::Flag(self.pp),
        }
    }

    pub fn text(&self, field: FieldName) -> Option<&str> {
        match field {
            FieldName::Username => Some(&self.username),
            FieldName::Address => Some(&self.address),
            _ => None,
        }
    }

    pub fn flag(&self, field: FieldName) -> Option<bool> {
        match field {
            FieldName::Toc => Some(self.toc),
            FieldName::Pp => Some(self.pp),
            _ => None,
        }
    }

    /// Store `value` into `field`. A value of the wrong kind leaves the record unchanged.
    pub fn set(&mut self, field: FieldName, value: FieldValue) -> Result<(), WizardError> {
        match (field, value) {
            (FieldName::Username, FieldValue::Text(s)) => self.username = s,
            (FieldName::Address, FieldValue::Text(s)) => self.address = s,
            (FieldName::Toc, FieldValue::Flag(b)) => self.toc = b,
            (FieldName::Pp, FieldValue::Flag(b)) => self.pp = b,
            (field, value) => {
                return Err(WizardError::KindMismatch {
                    field,
                    expected: field.kind(),
                    got: value.kind(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_ids_match_payload_keys() {
        let json = serde_json::to_value(SignupValues::default()).unwrap();
        let keys = json.as_object().unwrap();
        assert_eq!(keys.len(), FieldName::ALL.len());
        for f in FieldName::ALL {
            assert!(keys.contains_key(f.as_id()), "missing key {}", f);
        }
    }

    #[test]
    fn set_rejects_wrong_kind_without_mutation() {
        let mut v = SignupValues {
            username: "abc".to_string(),
            ..Default::default()
        };
        let err = v.set(FieldName::Username, FieldValue::Flag(true)).unwrap_err();
        assert!(matches!(err, WizardError::KindMismatch { field: FieldName::Username, .. }));
        assert_eq!(v.username, "abc");

        assert!(v.set(FieldName::Toc, "yes".into()).is_err());
        assert!(!v.toc);
    }

    #[test]
    fn payload_shape_matches_submission_contract() {
        let v = SignupValues {
            username: "abc".to_string(),
            address: "1 Main St".to_string(),
            toc: true,
            pp: true,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "username": "abc",
                "address": "1 Main St",
                "toc": true,
                "pp": true,
            })
        );
    }

    #[test]
    fn get_returns_typed_values() {
        let mut v = SignupValues::default();
        v.set(FieldName::Address, "1 Main St".into()).unwrap();
        v.set(FieldName::Pp, true.into()).unwrap();
        assert_eq!(v.get(FieldName::Address), FieldValue::Text("1 Main St".to_string()));
        assert_eq!(v.get(FieldName::Pp), FieldValue::Flag(true));
        assert_eq!(v.flag(FieldName::Username), None);
        assert_eq!(v.text(FieldName::Toc), None);
    }
}
