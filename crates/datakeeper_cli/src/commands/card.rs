//! Card commands.

use super::{CliResult, LocalVault};
use clap::Subcommand;
use datakeeper_core::{parse_id, CardPatch, CardSecret, UpdateRequest};
use serde_json::{json, Value};

/// Card subcommands.
#[derive(Debug, Subcommand)]
pub enum CardAction {
    /// Store a payment card
    Add {
        /// Label for the card
        #[arg(long)]
        label: String,
        /// Card number
        #[arg(long)]
        number: String,
        /// Security code
        #[arg(long)]
        cvv: String,
        /// Holder name
        #[arg(long)]
        name: String,
        /// Expiry, e.g. 12/30
        #[arg(long)]
        expires: String,
    },

    /// Change some fields of a stored card
    Update {
        /// Record id
        id: String,
        /// New label
        #[arg(long)]
        label: Option<String>,
        /// New card number
        #[arg(long)]
        number: Option<String>,
        /// New security code
        #[arg(long)]
        cvv: Option<String>,
        /// New holder name
        #[arg(long)]
        name: Option<String>,
        /// New expiry
        #[arg(long)]
        expires: Option<String>,
    },

    /// Delete a card
    Rm {
        /// Record id
        id: String,
    },

    /// List cards
    Ls,
}

/// Runs a card subcommand.
pub fn run(local: &LocalVault, action: CardAction) -> CliResult<Value> {
    let cards = local.vault.cards();
    let ctx = &local.ctx;
    let value = match action {
        CardAction::Add {
            label,
            number,
            cvv,
            name,
            expires,
        } => {
            let secret = CardSecret {
                key: label,
                number,
                cvv,
                name,
                expires,
            };
            json!({ "id": cards.create(ctx, secret)? })
        }
        CardAction::Update {
            id,
            label,
            number,
            cvv,
            name,
            expires,
        } => {
            let patch = CardPatch {
                key: label,
                number,
                cvv,
                name,
                expires,
            };
            json!({ "id": cards.update(ctx, UpdateRequest::new(parse_id(&id)?, patch))? })
        }
        CardAction::Rm { id } => json!({ "id": cards.delete(ctx, parse_id(&id)?)? }),
        CardAction::Ls => serde_json::to_value(cards.list(ctx)?)?,
    };
    Ok(value)
}
