//! Contract bindings for the ERC-20 tokens and the deployed swap contract.
use alloy::sol;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}

sol! {
    #[sol(rpc)]
    interface ITokenSwap {
        event Swap(
            address indexed user,
            address indexed fromToken,
            address indexed toToken,
            uint256 amountIn,
            uint256 amountOut
        );

        function owner() external view returns (address);
        function getExchangeRate(address fromToken, address toToken) external view returns (uint256);
        function setExchangeRate(address fromToken, address toToken, uint256 rate) external;
        function swap(address fromToken, address toToken, uint256 amount) external;
        function withdrawToken(address token, uint256 amount) external;
    }
}
