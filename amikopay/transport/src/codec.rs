//! Length-prefixed JSON framing: a big-endian `u32` byte count followed by
//! that many bytes of `serde_json`-encoded payload. Deliberately the
//! simplest framing that survives TCP's lack of message boundaries — wire
//! compression/versioning is out of scope.
use amikopay_messages::Envelope;
use tokio::io::{
	AsyncReadExt,
	AsyncWriteExt,
};

use crate::errors::TransportError;

const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

pub async fn write_envelope<W: AsyncWriteExt + Unpin>(writer: &mut W, envelope: &Envelope) -> Result<(), TransportError> {
	let body = serde_json::to_vec(envelope)?;
	let len = body.len() as u32;
	writer.write_all(&len.to_be_bytes()).await?;
	writer.write_all(&body).await?;
	writer.flush().await?;
	Ok(())
}

pub async fn read_envelope<R: AsyncReadExt + Unpin>(reader: &mut R) -> Result<Envelope, TransportError> {
	let mut len_buf = [0u8; 4];
	reader.read_exact(&mut len_buf).await?;
	let len = u32::from_be_bytes(len_buf);
	if len > MAX_FRAME_BYTES {
		return Err(TransportError::Init(format!("frame of {len} bytes exceeds the {MAX_FRAME_BYTES} byte limit")))
	}
	let mut body = vec![0u8; len as usize];
	reader.read_exact(&mut body).await?;
	Ok(serde_json::from_slice(&body)?)
}
