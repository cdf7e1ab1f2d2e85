//! Binary layout of the payloads that travel between chains.
//!
//! Every payload starts with a version byte and a big-endian `u16` discriminator, followed by
//! its fields in a fixed order. Integers are big-endian, byte strings and strings carry a `u32`
//! length prefix. Decoding rejects unknown versions, unknown discriminators, truncated input and
//! trailing bytes.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Binary, OverflowError, OverflowOperation, Uint128};
use thiserror::Error;

pub const CODEC_VERSION: u8 = 1;

pub const MSG_TYPE_UNSTAKE: u16 = 1;
pub const MSG_TYPE_COMPOSE: u16 = 2;
pub const OPTIONS_TYPE_EXECUTOR: u16 = 3;

pub const INITIATE_COOLDOWN: &[u8] = b"INITIATE_COOLDOWN";
pub const FAST_REDEEM: &[u8] = b"FAST_REDEEM";

#[derive(Error, Debug, PartialEq)]
pub enum CodecError {
    #[error("Unsupported payload version {version}")]
    UnsupportedVersion { version: u8 },

    #[error("Unknown message type {msg_type}")]
    UnknownMessageType { msg_type: u16 },

    #[error("Payload truncated: {needed} bytes needed at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("Payload has {count} trailing bytes")]
    TrailingBytes { count: usize },

    #[error("Payload contains an invalid utf-8 string")]
    InvalidUtf8 {},
}

pub type CodecResult<T> = Result<T, CodecError>;

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn new(tag: u16) -> Self {
        let mut writer = Writer { buf: vec![] };
        writer.u8(CODEC_VERSION);
        writer.u16(tag);
        writer
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn u128(&mut self, v: Uint128) {
        self.buf.extend_from_slice(&v.u128().to_be_bytes());
    }

    fn bytes(&mut self, v: &[u8]) {
        self.u32(v.len() as u32);
        self.buf.extend_from_slice(v);
    }

    fn string(&mut self, v: &str) {
        self.bytes(v.as_bytes());
    }

    fn finish(self) -> Binary {
        Binary::from(self.buf)
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Reads the version byte and returns the reader positioned after the discriminator.
    fn open(data: &'a [u8]) -> CodecResult<(Self, u16)> {
        let mut reader = Reader { data, offset: 0 };
        let version = reader.u8()?;
        if version != CODEC_VERSION {
            return Err(CodecError::UnsupportedVersion { version });
        }
        let tag = reader.u16()?;
        Ok((reader, tag))
    }

    fn take<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let slice = self.slice(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn slice(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(CodecError::Truncated {
                offset: self.offset,
                needed: len,
            })?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u8(&mut self) -> CodecResult<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn u16(&mut self) -> CodecResult<u16> {
        Ok(u16::from_be_bytes(self.take()?))
    }

    fn u32(&mut self) -> CodecResult<u32> {
        Ok(u32::from_be_bytes(self.take()?))
    }

    fn u64(&mut self) -> CodecResult<u64> {
        Ok(u64::from_be_bytes(self.take()?))
    }

    fn u128(&mut self) -> CodecResult<Uint128> {
        Ok(Uint128::new(u128::from_be_bytes(self.take()?)))
    }

    fn bytes(&mut self) -> CodecResult<Binary> {
        let len = self.u32()? as usize;
        Ok(Binary::from(self.slice(len)?))
    }

    fn string(&mut self) -> CodecResult<String> {
        let len = self.u32()? as usize;
        let raw = self.slice(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| CodecError::InvalidUtf8 {})
    }

    fn finish(self) -> CodecResult<()> {
        match self.data.len() - self.offset {
            0 => Ok(()),
            count => Err(CodecError::TrailingBytes { count }),
        }
    }
}

/// Spoke to hub request. `user` is always the account that called the messenger,
/// `extra_options` go to the bridge with the hub's return leg.
#[cw_serde]
pub struct UnstakeMessage {
    pub user: String,
    pub extra_options: Binary,
}

/// Messages delivered to the hub composer outside of a token transfer.
#[cw_serde]
pub enum HubMessage {
    Unstake(UnstakeMessage),
}

impl HubMessage {
    pub fn msg_type(&self) -> u16 {
        match self {
            HubMessage::Unstake(_) => MSG_TYPE_UNSTAKE,
        }
    }

    pub fn encode(&self) -> Binary {
        let mut w = Writer::new(self.msg_type());
        match self {
            HubMessage::Unstake(msg) => {
                w.string(&msg.user);
                w.bytes(&msg.extra_options);
            }
        }
        w.finish()
    }

    pub fn decode(data: &[u8]) -> CodecResult<Self> {
        let (mut r, msg_type) = Reader::open(data)?;
        let message = match msg_type {
            MSG_TYPE_UNSTAKE => HubMessage::Unstake(UnstakeMessage {
                user: r.string()?,
                extra_options: r.bytes()?,
            }),
            msg_type => return Err(CodecError::UnknownMessageType { msg_type }),
        };
        r.finish()?;
        Ok(message)
    }
}

/// Parameters of a token transfer to another chain.
#[cw_serde]
pub struct SendParam {
    pub dst_chain: u32,
    pub to: String,
    pub amount: Uint128,
    pub min_amount: Uint128,
    pub extra_options: Binary,
    pub compose_msg: Binary,
    pub command: Binary,
}

impl SendParam {
    fn write(&self, w: &mut Writer) {
        w.u32(self.dst_chain);
        w.string(&self.to);
        w.u128(self.amount);
        w.u128(self.min_amount);
        w.bytes(&self.extra_options);
        w.bytes(&self.compose_msg);
        w.bytes(&self.command);
    }

    fn read(r: &mut Reader) -> CodecResult<Self> {
        Ok(SendParam {
            dst_chain: r.u32()?,
            to: r.string()?,
            amount: r.u128()?,
            min_amount: r.u128()?,
            extra_options: r.bytes()?,
            compose_msg: r.bytes()?,
            command: r.bytes()?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComposeCommand {
    InitiateCooldown,
    FastRedeem,
}

impl ComposeCommand {
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            ComposeCommand::InitiateCooldown => INITIATE_COOLDOWN,
            ComposeCommand::FastRedeem => FAST_REDEEM,
        }
    }

    pub fn parse(raw: &[u8]) -> Option<Self> {
        match raw {
            INITIATE_COOLDOWN => Some(ComposeCommand::InitiateCooldown),
            FAST_REDEEM => Some(ComposeCommand::FastRedeem),
            _ => None,
        }
    }
}

/// Instruction riding alongside a bridged-in transfer. `send_param` describes the return leg,
/// its `command` selects what the hub does with bridged-in shares.
#[cw_serde]
pub struct ComposeMessage {
    pub send_param: SendParam,
    pub min_msg_value: Uint128,
}

impl ComposeMessage {
    pub fn command(&self) -> Option<ComposeCommand> {
        ComposeCommand::parse(self.send_param.command.as_slice())
    }

    pub fn encode(&self) -> Binary {
        let mut w = Writer::new(MSG_TYPE_COMPOSE);
        self.send_param.write(&mut w);
        w.u128(self.min_msg_value);
        w.finish()
    }

    pub fn decode(data: &[u8]) -> CodecResult<Self> {
        let (mut r, msg_type) = Reader::open(data)?;
        if msg_type != MSG_TYPE_COMPOSE {
            return Err(CodecError::UnknownMessageType { msg_type });
        }
        let send_param = SendParam::read(&mut r)?;
        let min_msg_value = r.u128()?;
        r.finish()?;
        Ok(ComposeMessage {
            send_param,
            min_msg_value,
        })
    }
}

/// Execution options attached to an outbound message. `native_drop` is handed to the receiving
/// application on the destination chain together with the message.
#[cw_serde]
#[derive(Default)]
pub struct ExecutorOptions {
    pub receive_gas: u64,
    pub native_drop: Uint128,
}

impl ExecutorOptions {
    /// Field-wise sum, the way an executor merges enforced and caller options.
    pub fn combine(&self, other: &ExecutorOptions) -> Result<ExecutorOptions, OverflowError> {
        let receive_gas = self.receive_gas.checked_add(other.receive_gas).ok_or_else(|| {
            OverflowError::new(OverflowOperation::Add, self.receive_gas, other.receive_gas)
        })?;
        Ok(ExecutorOptions {
            receive_gas,
            native_drop: self.native_drop.checked_add(other.native_drop)?,
        })
    }

    pub fn encode(&self) -> Binary {
        let mut w = Writer::new(OPTIONS_TYPE_EXECUTOR);
        w.u64(self.receive_gas);
        w.u128(self.native_drop);
        w.finish()
    }

    /// Empty options decode to the default.
    pub fn decode(data: &[u8]) -> CodecResult<Self> {
        if data.is_empty() {
            return Ok(ExecutorOptions::default());
        }
        let (mut r, options_type) = Reader::open(data)?;
        if options_type != OPTIONS_TYPE_EXECUTOR {
            return Err(CodecError::UnknownMessageType {
                msg_type: options_type,
            });
        }
        let options = ExecutorOptions {
            receive_gas: r.u64()?,
            native_drop: r.u128()?,
        };
        r.finish()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send_param() -> SendParam {
        SendParam {
            dst_chain: 30101,
            to: "spoke_user".to_string(),
            amount: Uint128::new(1_000),
            min_amount: Uint128::new(990),
            extra_options: Binary::from(b"opts".to_vec()),
            compose_msg: Binary::default(),
            command: Binary::from(FAST_REDEEM),
        }
    }

    #[test]
    fn unstake_message_layout() {
        let msg = HubMessage::Unstake(UnstakeMessage {
            user: "abc".to_string(),
            extra_options: Binary::default(),
        });
        let encoded = msg.encode();
        assert_eq!(
            encoded.as_slice(),
            &[1, 0, 1, 0, 0, 0, 3, b'a', b'b', b'c', 0, 0, 0, 0]
        );
        assert_eq!(HubMessage::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        let err = HubMessage::decode(&[1, 0, 7]).unwrap_err();
        assert_eq!(err, CodecError::UnknownMessageType { msg_type: 7 });
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut encoded = HubMessage::Unstake(UnstakeMessage {
            user: "abc".to_string(),
            extra_options: Binary::default(),
        })
        .encode()
        .to_vec();
        encoded[0] = 2;
        assert_eq!(
            HubMessage::decode(&encoded).unwrap_err(),
            CodecError::UnsupportedVersion { version: 2 }
        );
    }

    #[test]
    fn truncated_and_trailing_payloads_are_rejected() {
        let encoded = ComposeMessage {
            send_param: send_param(),
            min_msg_value: Uint128::new(5),
        }
        .encode()
        .to_vec();

        let truncated = &encoded[..encoded.len() - 3];
        assert!(matches!(
            ComposeMessage::decode(truncated).unwrap_err(),
            CodecError::Truncated { .. }
        ));

        let mut trailing = encoded.clone();
        trailing.push(0);
        assert_eq!(
            ComposeMessage::decode(&trailing).unwrap_err(),
            CodecError::TrailingBytes { count: 1 }
        );
    }

    #[test]
    fn compose_message_round_trip() {
        let msg = ComposeMessage {
            send_param: send_param(),
            min_msg_value: Uint128::new(5),
        };
        let decoded = ComposeMessage::decode(&msg.encode()).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.command(), Some(ComposeCommand::FastRedeem));
    }

    #[test]
    fn compose_message_keeps_unknown_commands() {
        let mut param = send_param();
        param.command = Binary::from(b"SOMETHING_ELSE".to_vec());
        let msg = ComposeMessage {
            send_param: param,
            min_msg_value: Uint128::zero(),
        };
        let decoded = ComposeMessage::decode(&msg.encode()).unwrap();
        assert_eq!(decoded.command(), None);
        assert_eq!(decoded.send_param.command.as_slice(), b"SOMETHING_ELSE");
    }

    #[test]
    fn executor_options_round_trip_and_combine() {
        let enforced = ExecutorOptions {
            receive_gas: 200_000,
            native_drop: Uint128::zero(),
        };
        let caller = ExecutorOptions {
            receive_gas: 150_000,
            native_drop: Uint128::new(42),
        };
        let combined = enforced.combine(&caller).unwrap();
        assert_eq!(combined.receive_gas, 350_000);
        assert_eq!(combined.native_drop, Uint128::new(42));
        assert_eq!(
            ExecutorOptions::decode(&combined.encode()).unwrap(),
            combined
        );
        assert_eq!(
            ExecutorOptions::decode(&[]).unwrap(),
            ExecutorOptions::default()
        );
    }
}
