//! Nintendo AST (GameCube streams split in `BLCK` blocks)

use super::{not_format, open_channels};
use crate::core::{BlockedLayout, CodingType, LayoutType, MetaType, VgmStream};
use crate::error::{VgmError, VgmResult};
use crate::layout::blocked::ast_block_update;
use crate::streamfile::{StreamFileExt, StreamFileRef};

/// Size of the `STRM` header; the first block follows it
const HEADER_SIZE: u64 = 0x40;

/// Parse an AST header and position the session on the first block
pub fn init(sf: &StreamFileRef) -> VgmResult<VgmStream> {
    if !sf.check_id(0, b"STRM") {
        return Err(not_format("AST"));
    }
    if sf.read_u16_be(0xa)? != 16 || sf.read_u32_be(4)? as u64 + HEADER_SIZE != sf.size() {
        return Err(VgmError::InvalidMetadata("AST size or bit depth mismatch".to_string()));
    }
    if !sf.check_id(HEADER_SIZE, b"BLCK") {
        return Err(VgmError::InvalidMetadata("AST without a first block".to_string()));
    }

    let coding_type = match sf.read_u16_be(8)? {
        0 => CodingType::NgcAfc,
        1 => CodingType::Pcm16Be,
        codec => {
            return Err(VgmError::InvalidMetadata(format!(
                "Unknown AST codec {}",
                codec
            )));
        }
    };
    let channels = sf.read_u16_be(0xc)? as usize;
    let loop_flag = sf.read_u16_be(0xe)? != 0;

    let mut vgm = VgmStream::allocate(channels, loop_flag)?;
    vgm.meta_type = MetaType::Ast;
    vgm.coding_type = coding_type;
    vgm.layout_type = LayoutType::Blocked(BlockedLayout::Ast);
    vgm.sample_rate = sf.read_u32_be(0x10)?;
    vgm.num_samples = sf.read_u32_be(0x14)? as usize;
    vgm.loop_start_sample = sf.read_u32_be(0x18)? as usize;
    vgm.loop_end_sample = sf.read_u32_be(0x1c)? as usize;

    open_channels(&mut vgm, sf, HEADER_SIZE, 0);
    ast_block_update(HEADER_SIZE, &mut vgm)?;

    Ok(vgm)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::streamfile::MemoryStreamFile;

    /// Stereo PCM16BE AST with blocks of 2 and 1 samples
    fn ast() -> Vec<u8> {
        let mut body = Vec::new();
        for (block, samples) in [(&[1i16, 2][..], &[-1i16, -2][..]), (&[3][..], &[-3][..])] {
            let size = block.len() as u32 * 2;
            let mut header = vec![0u8; 0x20];
            header[0..4].copy_from_slice(b"BLCK");
            header[4..8].copy_from_slice(&size.to_be_bytes());
            body.extend_from_slice(&header);
            for v in block.iter().chain(samples.iter()) {
                body.extend_from_slice(&v.to_be_bytes());
            }
        }

        let mut data = vec![0u8; 0x40];
        data[0..4].copy_from_slice(b"STRM");
        data[4..8].copy_from_slice(&(body.len() as u32).to_be_bytes());
        data[8..10].copy_from_slice(&1u16.to_be_bytes());
        data[0xa..0xc].copy_from_slice(&16u16.to_be_bytes());
        data[0xc..0xe].copy_from_slice(&2u16.to_be_bytes());
        data[0x10..0x14].copy_from_slice(&32000u32.to_be_bytes());
        data[0x14..0x18].copy_from_slice(&3u32.to_be_bytes());
        data.extend_from_slice(&body);
        data
    }

    #[test]
    fn test_ast_blocks() {
        let sf = MemoryStreamFile::new("bgm.ast", ast()).into_ref();
        let mut vgm = init(&sf).unwrap();
        vgm.capture_start();
        assert_eq!(vgm.position().current_block_offset, Some(0x40));

        let mut buf = [0i16; 6];
        assert_eq!(vgm.render(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, -1, 2, -2, 3, -3]);
    }

    #[test]
    fn test_truncated_ast_rejected() {
        let mut data = ast();
        data.pop();
        let sf = MemoryStreamFile::new("bgm.ast", data).into_ref();
        assert!(init(&sf).is_err());
    }
}
