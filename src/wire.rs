//! Wire format: fixed-layout, big-endian records and the request magics.
//!
//! Every multi-byte field is network byte order with no padding between
//! fields. The fountain packet carries the 64-bit seed (not the degree or an
//! index list); receivers regenerate the block selection from it.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::block::FileMetadata;
use crate::fountain::FountainPacket;

/// Empty-body datagram asking for the file metadata record.
pub const MAGIC_REQUEST_INFO: u32 = u32::from_be_bytes(*b"FCRQ");
/// Empty-body datagram announcing the client is ready for a packet burst.
pub const MAGIC_WAITING: u32 = u32::from_be_bytes(*b"FCWT");
/// Metadata reply record.
pub const MAGIC_INFO: u32 = u32::from_be_bytes(*b"FCIN");
/// Fountain packet record.
pub const MAGIC_BLOCK: u32 = u32::from_be_bytes(*b"FCBK");

/// Fixed width of the filename field in the metadata record, NUL-padded.
pub const FILENAME_LEN: usize = 256;
/// Total metadata record size: magic + block_size + block_count + file_size +
/// filename.
pub const METADATA_LEN: usize = 4 + 2 + 2 + 4 + FILENAME_LEN;
/// Fountain packet bytes preceding the payload: magic + seed.
pub const PACKET_HEADER_LEN: usize = 4 + 8;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Datagram too short: {got} bytes, need {need}")]
    Truncated { got: usize, need: usize },
    #[error("Datagram too long: {got} bytes, expected {need}")]
    Oversized { got: usize, need: usize },
    #[error("Unexpected magic: {0:#010x}")]
    BadMagic(u32),
}

/// Classification of an inbound request datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Metadata request.
    Info,
    /// Burst request.
    Burst,
    /// Anything else, including datagrams too short to carry a magic.
    Unknown(Option<u32>),
}

impl Request {
    pub fn classify(datagram: &[u8]) -> Request {
        if datagram.len() < 4 {
            return Request::Unknown(None);
        }
        let magic = u32::from_be_bytes([datagram[0], datagram[1], datagram[2], datagram[3]]);
        match magic {
            MAGIC_REQUEST_INFO => Request::Info,
            MAGIC_WAITING => Request::Burst,
            other => Request::Unknown(Some(other)),
        }
    }
}

fn put_metadata(buf: &mut BytesMut, magic: u32, metadata: &FileMetadata) {
    buf.put_u32(magic);
    buf.put_u16(metadata.block_size);
    buf.put_u16(metadata.block_count);
    buf.put_u32(metadata.file_size);

    // NUL-padded, always NUL-terminated: at most FILENAME_LEN - 1 name bytes.
    let name = metadata.filename.as_bytes();
    let take = name.len().min(FILENAME_LEN - 1);
    buf.put_slice(&name[..take]);
    buf.put_bytes(0, FILENAME_LEN - take);
}

/// Serialize the metadata reply record.
pub fn encode_metadata(metadata: &FileMetadata) -> Bytes {
    let mut buf = BytesMut::with_capacity(METADATA_LEN);
    put_metadata(&mut buf, MAGIC_INFO, metadata);
    buf.freeze()
}

/// Parse a metadata reply record (receiver side).
pub fn decode_metadata(datagram: &[u8]) -> Result<FileMetadata, WireError> {
    if datagram.len() < METADATA_LEN {
        return Err(WireError::Truncated {
            got: datagram.len(),
            need: METADATA_LEN,
        });
    }
    let mut buf = datagram;
    let magic = buf.get_u32();
    if magic != MAGIC_INFO {
        return Err(WireError::BadMagic(magic));
    }
    let block_size = buf.get_u16();
    let block_count = buf.get_u16();
    let file_size = buf.get_u32();

    let name_end = buf[..FILENAME_LEN].iter().position(|&b| b == 0).unwrap_or(FILENAME_LEN);
    let filename = String::from_utf8_lossy(&buf[..name_end]).into_owned();

    Ok(FileMetadata {
        block_size,
        block_count,
        file_size,
        filename,
    })
}

/// Serialize a fountain packet record.
pub fn encode_packet(packet: &FountainPacket) -> Bytes {
    let mut buf = BytesMut::with_capacity(PACKET_HEADER_LEN + packet.payload().len());
    buf.put_u32(MAGIC_BLOCK);
    buf.put_u64(packet.seed());
    buf.put_slice(packet.payload());
    buf.freeze()
}

/// Parse a fountain packet record; the payload is everything after the header
/// and must be exactly `block_size` bytes, so the record length is fixed.
pub fn decode_packet(datagram: &[u8], block_size: u16) -> Result<FountainPacket, WireError> {
    let need = PACKET_HEADER_LEN + block_size as usize;
    if datagram.len() < need {
        return Err(WireError::Truncated {
            got: datagram.len(),
            need,
        });
    }
    if datagram.len() > need {
        return Err(WireError::Oversized {
            got: datagram.len(),
            need,
        });
    }
    let mut buf = datagram;
    let magic = buf.get_u32();
    if magic != MAGIC_BLOCK {
        return Err(WireError::BadMagic(magic));
    }
    let seed = buf.get_u64();
    Ok(FountainPacket::new(seed, buf[..block_size as usize].to_vec()))
}
