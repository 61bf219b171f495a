use alloy::primitives::{Address, U256};

use crate::chain::TxReceipt;
use crate::contracts::Token;
use crate::error::Error;
use crate::session::Session;
use crate::wallet::Account;

/// Default amount sent by [`fund_with_token`]: 0.1 token at 18 decimals
pub const DEFAULT_FUNDING_AMOUNT: u128 = 10u128.pow(17);

/// Logical name of the token used when none is given
pub const DEFAULT_FUNDING_TOKEN: &str = "link_token";

/// Transfer `amount` of a token to `target` and wait for one confirmation.
///
/// The account defaults to the session's default account and the token to the
/// contract resolved as [`DEFAULT_FUNDING_TOKEN`].
pub async fn fund_with_token(
    session: &Session,
    target: Address,
    account: Option<&Account>,
    token: Option<&Token>,
    amount: Option<U256>,
) -> Result<TxReceipt, Error> {
    let account = match account {
        Some(account) => account.clone(),
        None => session.default_account()?,
    };
    let token = match token {
        Some(token) => token.clone(),
        None => {
            let handle = session.resolve_contract(DEFAULT_FUNDING_TOKEN).await?;
            session.token(handle.address)
        }
    };
    let amount = amount.unwrap_or(U256::from(DEFAULT_FUNDING_AMOUNT));

    let receipt = token.transfer(&account, target, amount).await?;
    session.chain().wait_for_confirmations(&receipt, 1).await?;
    tracing::info!("Funded {}", target);
    Ok(receipt)
}
