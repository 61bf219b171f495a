//! Solidity interfaces of the contracts the harness deploys and drives.

use alloy::sol;

sol! {
    /// Chainlink aggregator surface, as implemented by `MockV3Aggregator`.
    ///
    /// Round ids are `uint80` on chain; they are read as `uint256` here, which
    /// decodes identically.
    interface AggregatorV3Interface {
        function decimals() external view returns (uint8);
        function description() external view returns (string);
        function version() external view returns (uint256);
        function latestRoundData()
            external
            view
            returns (
                uint256 roundId,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint256 answeredInRound
            );
        function updateAnswer(int256 _answer) external;
    }

    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }

    interface ITokenFarm {
        function owner() external view returns (address);
        function transferOwnership(address newOwner) external;
        function dappToken() external view returns (address);
        function setPriceFeedContract(address _token, address _priceFeed) external;
        function tokenPriceFeedMapping(address _token) external view returns (address);
        function addAllowedTokens(address _token) external;
        function allowedTokens(uint256 index) external view returns (address);
        function tokenIsAllowed(address _token) external view returns (bool);
        function stakeTokens(uint256 _amount, address _token) external;
        function unstakeTokens(address _token) external;
        function issueTokens() external;
        function stakers(uint256 index) external view returns (address);
        function stakingBalance(address _token, address _user) external view returns (uint256);
        function uniqueTokensStaked(address _user) external view returns (uint256);
        function getUserTotalValue(address _user) external view returns (uint256);
        function getUserSingleTokenValue(address _user, address _token) external view returns (uint256);
        function getTokenValue(address _token) external view returns (uint256, uint256);
    }

    contract MockV3Aggregator {
        constructor(uint8 _decimals, int256 _initialAnswer);
    }

    contract TokenFarm {
        constructor(address _dappTokenAddress);
    }
}
