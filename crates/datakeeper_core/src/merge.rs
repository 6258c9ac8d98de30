//! Field-level merge for partial updates.
//!
//! An update request carries one `Option` per payload field. `None` keeps
//! the stored value, `Some(v)` replaces it, including `Some("")`, which
//! clears the field. The overlay rule lives in [`overlay`] and every patch
//! type applies it field by field.

use crate::payload::{CardSecret, CredentialSecret};
use serde::{Deserialize, Serialize};

/// A partial update of a payload of type `T`.
pub trait Patch<T> {
    /// Overlays the fields present in the patch onto `target`.
    fn apply_to(self, target: &mut T);

    /// Returns true if the patch sets no field.
    fn is_empty(&self) -> bool;
}

/// Replaces `slot` with `value` when a value was supplied.
pub fn overlay<V>(slot: &mut V, value: Option<V>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Partial update of a [`CredentialSecret`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPatch {
    /// New label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    /// New password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Patch<CredentialSecret> for CredentialPatch {
    fn apply_to(self, target: &mut CredentialSecret) {
        overlay(&mut target.name, self.name);
        overlay(&mut target.login, self.login);
        overlay(&mut target.password, self.password);
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.login.is_none() && self.password.is_none()
    }
}

/// Partial update of a [`CardSecret`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPatch {
    /// New label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// New card number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// New security code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
    /// New holder name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

impl Patch<CardSecret> for CardPatch {
    fn apply_to(self, target: &mut CardSecret) {
        overlay(&mut target.key, self.key);
        overlay(&mut target.number, self.number);
        overlay(&mut target.cvv, self.cvv);
        overlay(&mut target.name, self.name);
        overlay(&mut target.expires, self.expires);
    }

    fn is_empty(&self) -> bool {
        self.key.is_none()
            && self.number.is_none()
            && self.cvv.is_none()
            && self.name.is_none()
            && self.expires.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stored() -> CredentialSecret {
        CredentialSecret {
            name: "a".into(),
            login: "b".into(),
            password: "c".into(),
        }
    }

    #[test]
    fn only_present_fields_change() {
        let mut secret = stored();
        CredentialPatch {
            name: Some("x".into()),
            ..Default::default()
        }
        .apply_to(&mut secret);

        assert_eq!(
            secret,
            CredentialSecret {
                name: "x".into(),
                login: "b".into(),
                password: "c".into(),
            }
        );
    }

    #[test]
    fn empty_patch_is_noop() {
        let patch = CredentialPatch::default();
        assert!(patch.is_empty());

        let mut secret = stored();
        patch.apply_to(&mut secret);
        assert_eq!(secret, stored());
    }

    #[test]
    fn explicit_empty_string_clears() {
        let mut secret = stored();
        CredentialPatch {
            password: Some(String::new()),
            ..Default::default()
        }
        .apply_to(&mut secret);
        assert_eq!(secret.password, "");
        assert_eq!(secret.login, "b");
    }

    #[test]
    fn card_name_only_keeps_the_rest() {
        let mut card = CardSecret {
            key: "visa".into(),
            number: "4111111111111111".into(),
            cvv: "123".into(),
            name: "BOB".into(),
            expires: "12/30".into(),
        };
        CardPatch {
            name: Some("ALICE".into()),
            ..Default::default()
        }
        .apply_to(&mut card);

        assert_eq!(card.name, "ALICE");
        assert_eq!(card.number, "4111111111111111");
        assert_eq!(card.cvv, "123");
        assert_eq!(card.expires, "12/30");
        assert_eq!(card.key, "visa");
    }

    #[test]
    fn absent_and_null_fields_deserialize_as_none() {
        let patch: CardPatch = serde_json::from_str(r#"{"cvv":"999","name":null}"#).unwrap();
        assert_eq!(patch.cvv.as_deref(), Some("999"));
        assert!(patch.name.is_none());
        assert!(patch.number.is_none());

        let patch: CardPatch = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some(""));
    }

    fn opt() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[a-z0-9]{0,8}")
    }

    proptest! {
        #[test]
        fn card_fields_merge_independently(
            key in opt(), number in opt(), cvv in opt(), name in opt(), expires in opt()
        ) {
            let base = CardSecret {
                key: "k".into(),
                number: "n".into(),
                cvv: "c".into(),
                name: "m".into(),
                expires: "e".into(),
            };
            let patch = CardPatch {
                key: key.clone(),
                number: number.clone(),
                cvv: cvv.clone(),
                name: name.clone(),
                expires: expires.clone(),
            };
            let mut merged = base.clone();
            patch.apply_to(&mut merged);

            prop_assert_eq!(merged.key, key.unwrap_or(base.key));
            prop_assert_eq!(merged.number, number.unwrap_or(base.number));
            prop_assert_eq!(merged.cvv, cvv.unwrap_or(base.cvv));
            prop_assert_eq!(merged.name, name.unwrap_or(base.name));
            prop_assert_eq!(merged.expires, expires.unwrap_or(base.expires));
        }
    }
}
