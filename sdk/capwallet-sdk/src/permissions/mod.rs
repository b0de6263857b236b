//! Client-side evaluation of a role's grants.
//!
//! Every query is answered by any single grant that satisfies it; grants
//! are alternative routes, never stacked budgets. `All` satisfies every
//! query. Results are advisory: the wallet program re-evaluates on chain
//! against its own, possibly newer, state.

pub mod control;

use capwallet_state::{Action, Actions};
use solana_sdk::pubkey::Pubkey;

pub use control::SpendController;

/// Query view over a grant set.
#[derive(Debug, Clone, Copy)]
pub struct Permissions<'a> {
    actions: &'a Actions,
}

impl<'a> Permissions<'a> {
    pub fn new(actions: &'a Actions) -> Self {
        Self { actions }
    }

    pub fn has_root(&self) -> bool {
        self.actions.iter().any(|a| matches!(a, Action::All))
    }

    pub fn can_manage_authority(&self) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(a, Action::All | Action::ManageAuthority))
    }

    pub fn can_use_program(&self, program_id: &Pubkey) -> bool {
        let program_id = program_id.to_bytes();
        self.actions.iter().any(|a| match a {
            Action::All | Action::ProgramAll => true,
            Action::Program(p) => p.program_id == program_id,
            Action::ProgramScope(scope) => scope.program_id == program_id,
            _ => false,
        })
    }

    /// The curated list lives on chain, so this only reports the grant.
    pub fn has_curated_program_access(&self) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(a, Action::ProgramCurated))
    }

    pub fn can_use_sub_account(&self) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(a, Action::All | Action::SubAccount(_)))
    }

    pub fn sol_spend(&self) -> SpendController {
        if self.has_root() {
            return SpendController::uncapped();
        }
        SpendController::widest(self.actions.iter().filter_map(|a| match a {
            Action::SolLimit(limit) => Some(SpendController::once(limit.amount)),
            Action::SolRecurringLimit(limit) => Some(SpendController::recurring(
                limit.current_amount,
                limit.recurring_amount,
                limit.window,
                limit.last_reset,
            )),
            _ => None,
        }))
    }

    pub fn token_spend(&self, mint: &Pubkey) -> SpendController {
        if self.has_root() {
            return SpendController::uncapped();
        }
        let mint = mint.to_bytes();
        SpendController::widest(self.actions.iter().filter_map(|a| match a {
            Action::TokenLimit(limit) if limit.mint == mint => {
                Some(SpendController::once(limit.current_amount))
            },
            Action::TokenRecurringLimit(limit) if limit.mint == mint => {
                Some(SpendController::recurring(
                    limit.current_amount,
                    limit.recurring_amount,
                    limit.window,
                    limit.last_reset,
                ))
            },
            _ => None,
        }))
    }

    /// Largest lamport amount spendable now; `None` when uncapped.
    pub fn sol_spend_limit(&self) -> Option<u64> {
        self.sol_spend().amount
    }

    pub fn token_spend_limit(&self, mint: &Pubkey) -> Option<u64> {
        self.token_spend(mint).amount
    }

    pub fn can_spend_sol(&self, amount: Option<u64>) -> bool {
        self.sol_spend().can_spend(amount)
    }

    pub fn can_spend_sol_max(&self) -> bool {
        self.sol_spend().can_spend_max()
    }

    pub fn can_spend_token(&self, mint: &Pubkey, amount: Option<u64>) -> bool {
        self.token_spend(mint).can_spend(amount)
    }

    pub fn can_spend_token_max(&self, mint: &Pubkey) -> bool {
        self.token_spend(mint).can_spend_max()
    }
}

#[cfg(test)]
mod tests {
    use capwallet_state::action::ProgramScope;

    use super::*;

    fn actions(list: Vec<Action>) -> Actions {
        Actions::from_actions(list).unwrap()
    }

    #[test]
    fn test_limit_is_max_not_sum() {
        let set = actions(vec![
            Action::sol_limit(200),
            Action::sol_limit(500),
            Action::sol_limit(100),
        ]);
        let permissions = Permissions::new(&set);
        assert_eq!(permissions.sol_spend_limit(), Some(500));
        assert!(permissions.can_spend_sol(Some(500)));
        assert!(!permissions.can_spend_sol(Some(800)));
    }

    #[test]
    fn test_capped_grant_can_spend_without_amount() {
        let set = actions(vec![Action::sol_limit(500)]);
        let permissions = Permissions::new(&set);
        assert!(permissions.can_spend_sol(None));
        assert!(!permissions.can_spend_sol_max());

        let none = actions(vec![Action::ManageAuthority]);
        assert!(!Permissions::new(&none).can_spend_sol(None));
    }

    #[test]
    fn test_root_dominates_caps() {
        let set = actions(vec![Action::sol_limit(300), Action::All]);
        let permissions = Permissions::new(&set);
        assert_eq!(permissions.sol_spend_limit(), None);
        assert!(permissions.can_spend_sol(Some(1_000_000_000_000_000)));
        assert!(permissions.can_spend_sol_max());
        assert!(permissions.can_manage_authority());
        assert!(permissions.can_use_program(&Pubkey::new_unique()));
        assert!(permissions.can_use_sub_account());
    }

    #[test]
    fn test_no_matching_grant() {
        let program = Pubkey::new_unique();
        let set = actions(vec![Action::program(program.to_bytes())]);
        let permissions = Permissions::new(&set);
        assert!(!permissions.sol_spend().is_allowed);
        assert_eq!(permissions.sol_spend_limit(), Some(0));
        assert!(permissions.can_use_program(&program));
        assert!(!permissions.can_use_program(&Pubkey::new_unique()));
        assert!(!permissions.can_manage_authority());
    }

    #[test]
    fn test_recurring_reports_window() {
        let set = actions(vec![Action::sol_recurring_limit(1_000, 86_400)]);
        let controller = Permissions::new(&set).sol_spend();
        assert_eq!(controller.amount, Some(1_000));
        assert_eq!(controller.window, Some(86_400));
        assert_eq!(controller.recurring_amount, Some(1_000));
    }

    #[test]
    fn test_token_grants_match_mint() {
        let usdc = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let set = actions(vec![
            Action::token_limit(usdc.to_bytes(), 50),
            Action::token_recurring_limit(usdc.to_bytes(), 75, 10),
        ]);
        let permissions = Permissions::new(&set);
        assert_eq!(permissions.token_spend_limit(&usdc), Some(75));
        assert!(permissions.can_spend_token(&usdc, Some(75)));
        assert!(!permissions.can_spend_token_max(&usdc));
        assert_eq!(permissions.token_spend_limit(&other), Some(0));
        assert!(!permissions.can_spend_token(&other, Some(1)));
        assert!(!permissions.can_spend_sol(Some(1)));
    }

    #[test]
    fn test_program_grants() {
        let scoped = Pubkey::new_unique();
        let set = actions(vec![
            Action::ProgramScope(ProgramScope::basic(scoped.to_bytes(), [9u8; 32])),
            Action::ProgramCurated,
        ]);
        let permissions = Permissions::new(&set);
        assert!(permissions.can_use_program(&scoped));
        assert!(!permissions.can_use_program(&Pubkey::new_unique()));
        assert!(permissions.has_curated_program_access());

        let all = actions(vec![Action::ProgramAll]);
        assert!(Permissions::new(&all).can_use_program(&Pubkey::new_unique()));
        assert!(!Permissions::new(&all).has_root());
    }

    #[test]
    fn test_manage_authority_and_sub_account() {
        let set = actions(vec![Action::ManageAuthority, Action::sub_account([0u8; 32])]);
        let permissions = Permissions::new(&set);
        assert!(permissions.can_manage_authority());
        assert!(permissions.can_use_sub_account());
        assert!(!permissions.has_root());
    }
}
