/// Block headers and chain-positioned blocks.
pub mod block;
