//! Payment card secrets.

use super::{Secret, SecretStore};
use crate::merge::CardPatch;
use crate::payload::CardSecret;

impl Secret for CardSecret {
    type Patch = CardPatch;
}

/// Card usecase, stored under `CARD`.
pub type CardService = SecretStore<CardSecret>;

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::{CredentialService, UpdateRequest};
    use super::*;
    use crate::error::VaultError;
    use crate::payload::CredentialSecret;
    use std::sync::Arc;
    use std::thread;

    fn visa() -> CardSecret {
        CardSecret {
            key: "visa".into(),
            number: "4111111111111111".into(),
            cvv: "123".into(),
            name: "BOB".into(),
            expires: "12/30".into(),
        }
    }

    #[test]
    fn create_then_list() {
        let (deps, _) = deps();
        let service = CardService::new(deps);
        let id = service.create(&bob(), visa()).unwrap();

        let items = service.list(&bob()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].secret, visa());
    }

    #[test]
    fn updating_name_keeps_other_fields() {
        let (deps, _) = deps();
        let service = CardService::new(deps);
        let id = service.create(&bob(), visa()).unwrap();

        let patch = CardPatch {
            name: Some("ROBERT".into()),
            ..Default::default()
        };
        service.update(&bob(), UpdateRequest::new(id, patch)).unwrap();

        let card = &service.list(&bob()).unwrap()[0].secret;
        assert_eq!(card.name, "ROBERT");
        assert_eq!(card.number, "4111111111111111");
        assert_eq!(card.cvv, "123");
        assert_eq!(card.expires, "12/30");
    }

    #[test]
    fn cards_and_credentials_do_not_mix() {
        let (deps, _) = deps();
        let cards = CardService::new(deps.clone());
        let credentials = CredentialService::new(deps);

        let card = cards.create(&bob(), visa()).unwrap();
        credentials
            .create(&bob(), CredentialSecret::default())
            .unwrap();

        assert_eq!(cards.list(&bob()).unwrap().len(), 1);
        assert_eq!(credentials.list(&bob()).unwrap().len(), 1);
        assert!(matches!(
            credentials.update(&bob(), UpdateRequest::new(card, Default::default())),
            Err(VaultError::NotFound { .. })
        ));
    }

    #[test]
    fn concurrent_updates_last_write_wins() {
        let (deps, _) = deps();
        let service = Arc::new(CardService::new(deps));
        let id = service.create(&bob(), visa()).unwrap();

        let handles: Vec<_> = ["1111", "2222"]
            .into_iter()
            .map(|cvv| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    let patch = CardPatch {
                        cvv: Some(cvv.into()),
                        ..Default::default()
                    };
                    service.update(&bob(), UpdateRequest::new(id, patch)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let card = &service.list(&bob()).unwrap()[0].secret;
        assert!(card.cvv == "1111" || card.cvv == "2222");
        assert_eq!(card.number, "4111111111111111");
    }
}
