//! Bank account rules shared by the store and the REST layer.

use shared::{Account, AccountStats};

pub const INITIAL_DEPOSIT: &str = "Initial Deposit";
pub const OPENING_DESCRIPTION: &str = "Account opening deposit";
pub const DEPOSIT: &str = "Deposit";
pub const WITHDRAWAL: &str = "Withdrawal";

/// Sum of all account balances
pub fn total_balance(accounts: &[Account]) -> f64 {
    accounts.iter().map(|account| account.balance).sum()
}

/// Dashboard aggregates over all accounts; all zero when there are none
pub fn account_stats(accounts: &[Account]) -> AccountStats {
    if accounts.is_empty() {
        return AccountStats {
            account_count: 0,
            total_balance: 0.0,
            highest: 0.0,
            lowest: 0.0,
            average: 0.0,
        };
    }

    let total = total_balance(accounts);
    let highest = accounts.iter().map(|a| a.balance).fold(f64::MIN, f64::max);
    let lowest = accounts.iter().map(|a| a.balance).fold(f64::MAX, f64::min);

    AccountStats {
        account_count: accounts.len(),
        total_balance: total,
        highest,
        lowest,
        average: total / accounts.len() as f64,
    }
}
