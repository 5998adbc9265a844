use spv_consensus::{
    validator_set, Block, BlockChainAccessor, BlockHeader, BlockValidator, Checkpoint,
    CompactTarget, MemoryChain, Params, ValidationError,
};

const GENESIS_HEX: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";
const BLOCK_1_HEX: &str = "010000006fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000982051fd1e4ba744bbbe680e1fee14677ba1a3c3540bf7b1cdb606e857233e0e61bc6649ffff001d01e36299";
const BLOCK_2_HEX: &str = "010000004860eb18bf1b1620e37e9490fc8a427514416fd75159ab86688e9a8300000000d5fdcc541e25de1c7a5addedf24858b8bb665c9f36ef744ee42c316022c90f9bb0bc6649ffff001d08d2bd61";

fn header(hex: &str) -> BlockHeader {
    BlockHeader::from_hex(hex).unwrap()
}

fn genesis_chain() -> (Checkpoint, MemoryChain) {
    let params = Params::BITCOIN_MAINNET;
    let checkpoint = params.genesis_checkpoint().unwrap();
    let genesis = Block::new(header(GENESIS_HEX), 0);
    assert_eq!(genesis.hash(), checkpoint.hash);

    let mut chain = MemoryChain::new();
    chain.insert(genesis);
    (checkpoint, chain)
}

/// Links `header` to its stored parent, validates it and stores it.
fn accept(
    params: &Params,
    checkpoint: &Checkpoint,
    chain: &mut MemoryChain,
    header: BlockHeader,
) -> Result<(), ValidationError> {
    let previous = chain.block(&header.prev_blockhash()).unwrap();
    let block = Block::new(header, previous.height() + 1);
    validator_set(params, &checkpoint.hash, &*chain)?.validate(&block, &previous)?;
    chain.insert(block);
    Ok(())
}

#[test]
fn test_bitcoin_mainnet_first_blocks() {
    let params = Params::BITCOIN_MAINNET;
    let (checkpoint, mut chain) = genesis_chain();

    accept(&params, &checkpoint, &mut chain, header(BLOCK_1_HEX)).unwrap();
    accept(&params, &checkpoint, &mut chain, header(BLOCK_2_HEX)).unwrap();

    let tip = chain.tip().unwrap();
    assert_eq!(tip.height(), 2);
    assert_eq!(
        tip.hash().to_string(),
        "000000006a625f06636b8bb6ac7b960a8d03705d1ace08b1a19da3fdcc99ddbd"
    );
}

#[test]
fn test_tampered_header_is_rejected() {
    let params = Params::BITCOIN_MAINNET;
    let (checkpoint, mut chain) = genesis_chain();

    let original = header(BLOCK_1_HEX);
    let tampered = BlockHeader::new(
        original.version(),
        original.prev_blockhash(),
        original.merkle_root(),
        original.time() + 1,
        original.bits(),
        original.nonce(),
    );

    let result = accept(&params, &checkpoint, &mut chain, tampered);
    assert!(matches!(
        result,
        Err(ValidationError::InvalidProofOfWork { bits, .. }) if bits == CompactTarget::new(0x1d00ffff)
    ));
    assert_eq!(chain.len(), 1);
}

#[test]
fn test_unknown_checkpoint() {
    let params = Params::BITCOIN_MAINNET;
    let checkpoint = params.genesis_checkpoint().unwrap();
    let chain = MemoryChain::new();

    assert_eq!(
        validator_set(&params, &checkpoint.hash, &chain).err(),
        Some(ValidationError::NoCheckpointBlock {
            hash: checkpoint.hash
        })
    );
}
