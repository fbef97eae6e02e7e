//! Consensus parameters.

/// The genesis block hash of the Liquid network, in internal byte order.
///
/// Displayed by RPC methods as
/// `1466275836220db2944ca059a3a10ef6fd2ea684b0688d2c379296888a206003`.
pub const LIQUID_GENESIS_BLOCK_HASH: [u8; 32] = [
    0x03, 0x60, 0x20, 0x8a, 0x88, 0x96, 0x92, 0x37, 0x2c, 0x8d, 0x68, 0xb0, 0x84, 0xa6, 0x2e,
    0xfd, 0xf6, 0x0e, 0xa1, 0xa3, 0x59, 0xa0, 0x4c, 0x94, 0xb2, 0x0d, 0x22, 0x36, 0x58, 0x27,
    0x66, 0x14,
];

/// The genesis block hash of the Liquid test network, in internal byte order.
///
/// Displayed by RPC methods as
/// `a771da8e52ee6ad581ed1e9a99825e5b3b7992225534eaa2ae23244fe26ab1c1`.
pub const LIQUID_TESTNET_GENESIS_BLOCK_HASH: [u8; 32] = [
    0xc1, 0xb1, 0x6a, 0xe2, 0x4f, 0x24, 0x23, 0xae, 0xa2, 0xea, 0x34, 0x55, 0x22, 0x92, 0x79,
    0x3b, 0x5b, 0x5e, 0x82, 0x99, 0x9a, 0x1e, 0xed, 0x81, 0xd5, 0x6a, 0xee, 0x52, 0x8e, 0xda,
    0x71, 0xa7,
];

/// Chain-specific parameters that affect how transactions are authorized.
pub trait Parameters {
    /// The hash of the chain's genesis block.
    ///
    /// Taproot signature hashes commit to this value so that a signature produced for
    /// one Elements chain cannot be replayed on another.
    fn genesis_block_hash(&self) -> [u8; 32];
}

impl<P: Parameters> Parameters for &P {
    fn genesis_block_hash(&self) -> [u8; 32] {
        (*self).genesis_block_hash()
    }
}

/// Marker struct for the Liquid network.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct LiquidNetwork;

/// The production network.
pub const LIQUID_NETWORK: LiquidNetwork = LiquidNetwork;

impl Parameters for LiquidNetwork {
    fn genesis_block_hash(&self) -> [u8; 32] {
        LIQUID_GENESIS_BLOCK_HASH
    }
}

/// Marker struct for the Liquid test network.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct LiquidTestNetwork;

/// The public test network.
pub const LIQUID_TEST_NETWORK: LiquidTestNetwork = LiquidTestNetwork;

impl Parameters for LiquidTestNetwork {
    fn genesis_block_hash(&self) -> [u8; 32] {
        LIQUID_TESTNET_GENESIS_BLOCK_HASH
    }
}

/// The well-known Elements networks.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Network {
    Liquid,
    LiquidTestnet,
}

impl Parameters for Network {
    fn genesis_block_hash(&self) -> [u8; 32] {
        match self {
            Network::Liquid => LIQUID_NETWORK.genesis_block_hash(),
            Network::LiquidTestnet => LIQUID_TEST_NETWORK.genesis_block_hash(),
        }
    }
}

/// Parameters for a local or custom Elements chain, such as a regtest node.
///
/// The genesis block hash of such chains depends on the node's `-chain` and
/// `-con_*` options, so it has to be supplied by the caller.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub struct LocalNetwork {
    pub genesis_block_hash: [u8; 32],
}

impl Parameters for LocalNetwork {
    fn genesis_block_hash(&self) -> [u8; 32] {
        self.genesis_block_hash
    }
}
