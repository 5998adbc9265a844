use bitcoin::BlockHash;
use hex::FromHex;

use bitcoin::hashes::Hash;

/// Convert a hex string in display order (as printed by block explorers) to a
/// BlockHash.
pub fn blockhash_from_display(hex: &str) -> Result<BlockHash, hex::FromHexError> {
    let mut bytes = <[u8; 32]>::from_hex(hex)?;
    bytes.reverse();
    Ok(BlockHash::from_byte_array(bytes))
}
