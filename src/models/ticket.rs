use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::order::CartItem;
use crate::utils::codes;

/// How long an issued ticket stays redeemable.
const TICKET_VALIDITY_DAYS: i64 = 1;

const DEFAULT_ITEM_NAME: &str = "Ingresso";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Uuid,
    pub order_id: Uuid,
    pub account_id: Uuid,
    pub product_id: String,
    pub item_name: String,
    pub item_description: String,
    pub code: String,
    pub validated: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub validated_at: Option<DateTime<Utc>>,
}

/// A ticket about to be written: one per purchased unit, carrying an initial
/// redemption code. The store may swap the code for a fresh one if the
/// unique index reports a collision.
#[derive(Debug, Clone)]
pub struct TicketDraft {
    pub order_id: Uuid,
    pub account_id: Uuid,
    pub product_id: String,
    pub item_name: String,
    pub item_description: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Expands a confirmed order's cart into ticket drafts, one per unit of
/// quantity. A missing or zero quantity counts as one unit.
pub fn expand_cart(
    order_id: Uuid,
    account_id: Uuid,
    cart: &[CartItem],
    issued_at: DateTime<Utc>,
) -> Vec<TicketDraft> {
    let expires_at = issued_at + Duration::days(TICKET_VALIDITY_DAYS);
    let mut drafts = Vec::new();

    for item in cart {
        let quantity = item.quantity.unwrap_or(1).max(1);
        let item_name = item
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string());
        let item_description = item
            .description
            .clone()
            .unwrap_or_else(|| format!("Acesso ao evento {}", item_name));

        for _ in 0..quantity {
            drafts.push(TicketDraft {
                order_id,
                account_id,
                product_id: item.id.clone(),
                item_name: item_name.clone(),
                item_description: item_description.clone(),
                code: codes::redemption_code(&item.id),
                expires_at,
            });
        }
    }

    drafts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn item(id: &str, quantity: Option<u32>) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: Some(format!("Pulseira {}", id)),
            description: None,
            quantity,
        }
    }

    #[test]
    fn test_one_ticket_per_unit() {
        let cart = vec![item("A", Some(2)), item("B", Some(1))];
        let drafts = expand_cart(Uuid::new_v4(), Uuid::new_v4(), &cart, Utc::now());

        assert_eq!(drafts.len(), 3);
        assert_eq!(
            drafts.iter().filter(|d| d.product_id == "A").count(),
            2
        );
    }

    #[test]
    fn test_codes_are_distinct_and_well_formed() {
        let cart = vec![item("A", Some(2)), item("B", Some(1))];
        let drafts = expand_cart(Uuid::new_v4(), Uuid::new_v4(), &cart, Utc::now());

        let codes: HashSet<&str> = drafts.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes.len(), drafts.len());

        for code in codes {
            let (prefix, random) = code.split_once('-').expect("code has a dash");
            assert!(!prefix.is_empty() && prefix.len() <= 4);
            assert_eq!(random.len(), 8);
        }
    }

    #[test]
    fn test_missing_quantity_counts_as_one() {
        let cart = vec![item("A", None), item("B", Some(0))];
        let drafts = expand_cart(Uuid::new_v4(), Uuid::new_v4(), &cart, Utc::now());
        assert_eq!(drafts.len(), 2);
    }

    #[test]
    fn test_defaults_for_unnamed_items() {
        let cart = vec![CartItem {
            id: "X".to_string(),
            name: None,
            description: None,
            quantity: Some(1),
        }];
        let drafts = expand_cart(Uuid::new_v4(), Uuid::new_v4(), &cart, Utc::now());

        assert_eq!(drafts[0].item_name, "Ingresso");
        assert_eq!(drafts[0].item_description, "Acesso ao evento Ingresso");
    }

    #[test]
    fn test_expiry_is_one_day_after_issuance() {
        let issued_at = Utc::now();
        let cart = vec![item("A", Some(1))];
        let drafts = expand_cart(Uuid::new_v4(), Uuid::new_v4(), &cart, issued_at);
        assert_eq!(drafts[0].expires_at, issued_at + Duration::days(1));
    }
}
