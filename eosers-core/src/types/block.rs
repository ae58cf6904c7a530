use super::{BlockTimestamp, ChainId, Checksum256, Name, Tapos};
use serde::{Deserialize, Serialize};

/// Response of the chain's `get_info` endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    #[serde(default)]
    pub server_version: String,
    pub chain_id: ChainId,
    pub head_block_num: u32,
    #[serde(default)]
    pub last_irreversible_block_num: u32,
    #[serde(default)]
    pub last_irreversible_block_id: Option<Checksum256>,
    #[serde(default)]
    pub head_block_id: Option<Checksum256>,
    #[serde(default)]
    pub head_block_time: Option<BlockTimestamp>,
    #[serde(default)]
    pub head_block_producer: Option<Name>,
}

/// A block referenced by number or by id
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockId {
    Number(u32),
    Id(Checksum256),
}

impl From<u32> for BlockId {
    fn from(num: u32) -> Self {
        BlockId::Number(num)
    }
}

impl From<Checksum256> for BlockId {
    fn from(id: Checksum256) -> Self {
        BlockId::Id(id)
    }
}

/// The subset of a `get_block` response needed to reference a block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub timestamp: BlockTimestamp,
    #[serde(default)]
    pub producer: Option<Name>,
    #[serde(default)]
    pub previous: Option<Checksum256>,
    pub id: Checksum256,
    pub block_num: u32,
    #[serde(default)]
    pub ref_block_prefix: Option<u32>,
}

impl Block {
    /// Little-endian `u32` at bytes 8..12 of the block id
    pub fn derived_ref_block_prefix(&self) -> u32 {
        let id = self.id.as_bytes();
        u32::from_le_bytes([id[8], id[9], id[10], id[11]])
    }

    /// Reference-block fields for a transaction expiring `expire_seconds`
    /// after this block
    pub fn tapos(&self, expire_seconds: u32) -> Tapos {
        Tapos {
            expiration: self.timestamp.to_time_point_sec().saturating_add(expire_seconds),
            ref_block_num: (self.block_num & 0xffff) as u16,
            ref_block_prefix: self.derived_ref_block_prefix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block() -> Block {
        serde_json::from_value(serde_json::json!({
            "timestamp": "2018-06-01T12:00:00.500",
            "producer": "eosio",
            "confirmed": 0,
            "previous": "0000000000000000000000000000000000000000000000000000000000000000",
            "id": "0001e2400a4d4cb1b5a3c8b7af1ad6a0e7e8f6b2c1d4e5f60718293a4b5c6d7e",
            "block_num": 123456,
            "ref_block_prefix": 3083379637u32
        }))
        .unwrap()
    }

    #[test]
    fn derives_reference_fields() {
        let block = block();
        assert_eq!(block.derived_ref_block_prefix(), 0xb7c8_a3b5);
        assert_eq!(Some(block.derived_ref_block_prefix()), block.ref_block_prefix);

        let tapos = block.tapos(600);
        assert_eq!(tapos.ref_block_num, (123456 & 0xffff) as u16);
        // 12:00:00.500 rounds up to 12:00:01
        assert_eq!(tapos.expiration, "2018-06-01T12:10:01".parse().unwrap());
    }

    #[test]
    fn block_id_serializes_as_number_or_hex() {
        assert_eq!(serde_json::to_value(BlockId::from(7)).unwrap(), serde_json::json!(7));
        let id = block().id;
        assert_eq!(
            serde_json::to_value(BlockId::from(id)).unwrap(),
            serde_json::json!(id.to_string())
        );
    }

    #[test]
    fn chain_info_tolerates_missing_optional_fields() {
        let info: ChainInfo = serde_json::from_value(serde_json::json!({
            "chain_id": "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906",
            "head_block_num": 42,
            "server_version_string": "v2.0.0"
        }))
        .unwrap();
        assert_eq!(info.head_block_num, 42);
        assert!(info.head_block_id.is_none());
    }
}
