use alloy::primitives::{Address, U256};

use crate::chain::Constructor;
use crate::contracts::{Token, TokenFarm};
use crate::error::Error;
use crate::session::Session;
use crate::wallet::Account;

/// Dapp tokens the deployer keeps; the rest of the supply goes to the farm
pub const KEPT_BALANCE: u128 = 100 * 10u128.pow(18);

/// Deploy `DappToken` and `TokenFarm`, fund the farm with the reward supply and
/// register the allowed tokens with their price feeds.
pub async fn deploy_token_farm_and_dapp_token(
    session: &Session,
) -> Result<(TokenFarm, Token), Error> {
    let account = session.default_account()?;
    let resolver = session.resolver();

    let dapp_token = resolver.deploy(&account, Constructor::DappToken).await?;
    tracing::info!("Deployed DappToken at {}", dapp_token);
    let token_farm = resolver
        .deploy(&account, Constructor::TokenFarm { dapp_token })
        .await?;
    tracing::info!("Deployed TokenFarm at {}", token_farm);

    let dapp_token = session.token(dapp_token);
    let token_farm = session.token_farm(token_farm);

    let reward = dapp_token
        .total_supply()
        .await?
        .saturating_sub(U256::from(KEPT_BALANCE));
    let receipt = dapp_token
        .transfer(&account, token_farm.address(), reward)
        .await?;
    session.chain().wait_for_confirmations(&receipt, 1).await?;
    tracing::info!("Transferred {} DappToken to the farm", reward);

    let dai_usd = session.resolve_contract("dai_usd_price_feed").await?.address;
    let fau_token = session.resolve_contract("fau_token").await?.address;
    let weth_token = session.resolve_contract("weth_token").await?.address;
    let eth_usd = session.resolve_contract("eth_usd_price_feed").await?.address;

    let allowed = [
        (dapp_token.address(), dai_usd),
        (fau_token, dai_usd),
        (weth_token, eth_usd),
    ];
    add_allowed_tokens(&token_farm, &allowed, &account).await?;

    Ok((token_farm, dapp_token))
}

/// Allow each token on the farm and point it at its price feed
pub async fn add_allowed_tokens(
    token_farm: &TokenFarm,
    allowed: &[(Address, Address)],
    account: &Account,
) -> Result<(), Error> {
    for (token, price_feed) in allowed {
        token_farm.add_allowed_tokens(account, *token).await?;
        token_farm
            .set_price_feed_contract(account, *token, *price_feed)
            .await?;
        tracing::info!("Allowed {} priced by {}", token, price_feed);
    }
    Ok(())
}
