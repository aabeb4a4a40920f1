use serde::{Deserialize, Serialize};

use crate::domain::booking::Money;

/// Group-booking membership carried on each member booking.
///
/// Exactly one member of a group is primary; it alone carries the shared
/// billing adjustments. All members share the billing contact and the
/// human-readable reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMembership {
    pub group_id: String,
    pub reference: String,
    pub primary: bool,
    pub billing_contact: String,
    pub additional_charges: Money,
    pub discount: Money,
}

impl GroupMembership {
    pub fn member_of(group_id: &str, reference: &str, billing_contact: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            reference: reference.to_string(),
            primary: false,
            billing_contact: billing_contact.to_string(),
            additional_charges: Money::ZERO,
            discount: Money::ZERO,
        }
    }

    /// Moves the primary flag and its billing adjustments onto `successor`,
    /// zeroing them here.
    pub fn transfer_primary_to(&mut self, successor: &mut GroupMembership) {
        successor.primary = true;
        successor.additional_charges = self.additional_charges;
        successor.discount = self.discount;
        self.primary = false;
        self.additional_charges = Money::ZERO;
        self.discount = Money::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transfer_primary_moves_billing_adjustments() {
        let mut primary = GroupMembership {
            group_id: "g1".into(),
            reference: "GRP-A1B2C3".into(),
            primary: true,
            billing_contact: "Acme Travel".into(),
            additional_charges: Money::new(dec!(75.00)),
            discount: Money::new(dec!(20.00)),
        };
        let mut other = GroupMembership::member_of("g1", "GRP-A1B2C3", "Acme Travel");

        primary.transfer_primary_to(&mut other);

        assert!(other.primary);
        assert_eq!(other.additional_charges, Money::new(dec!(75.00)));
        assert_eq!(other.discount, Money::new(dec!(20.00)));
        assert!(!primary.primary);
        assert_eq!(primary.additional_charges, Money::ZERO);
        assert_eq!(primary.discount, Money::ZERO);
    }
}
