//! EOSIO chain types

mod name;
pub use name::{Name, ParseNameError, MAX_NAME_LEN};

mod checksum;
pub use checksum::{ChainId, Checksum256};

mod bytes;
pub use self::bytes::Bytes;

mod time;
pub use time::{parse_utc_millis, BlockTimestamp, ParseTimeError, TimePoint, TimePointSec};

mod asset;
pub use asset::{Asset, ParseAssetError, Symbol, SymbolCode, MAX_PRECISION, MAX_SYMBOL_CODE_LEN};

mod crypto;
pub use crypto::*;

mod action;
pub use action::{Action, EncodedAction, PermissionLevel, StructuredAction};

mod transaction;
pub use transaction::{Extension, Tapos, Transaction, TransactionError};

mod block;
pub use block::{Block, BlockId, ChainInfo};
