//! Access control for the privileged reward operation.

use sharepool_types::AccountId;

/// Decides whether an identity may inject rewards.
pub trait AccessControl {
    fn is_authorized_operator(&self, identity: &AccountId) -> bool;
}

/// Exactly one fixed operator identity, typically the pool's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleOperator {
    operator: AccountId,
}

impl SingleOperator {
    #[must_use]
    pub fn new(operator: AccountId) -> Self {
        Self { operator }
    }

    #[must_use]
    pub fn operator(&self) -> AccountId {
        self.operator
    }
}

impl AccessControl for SingleOperator {
    fn is_authorized_operator(&self, identity: &AccountId) -> bool {
        *identity == self.operator
    }
}
