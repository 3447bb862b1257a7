use crate::error::AttError;

/// Copy an attribute value into the peer's read buffer.
///
/// Serves `value[offset..]`, truncated to `buf`. An offset past the end of
/// the value is rejected; an offset equal to its length reads zero bytes.
pub fn read_attribute(buf: &mut [u8], offset: u16, value: &[u8]) -> Result<usize, AttError> {
    let offset = offset as usize;
    if offset > value.len() {
        return Err(AttError::InvalidOffset);
    }

    let len = buf.len().min(value.len() - offset);
    buf[..len].copy_from_slice(&value[offset..offset + len]);
    Ok(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_whole_value() {
        let mut buf = [0u8; 4];
        assert_eq!(read_attribute(&mut buf, 0, &[1]), Ok(1));
        assert_eq!(buf[0], 1);
    }

    #[test]
    fn offset_at_end_reads_nothing() {
        let mut buf = [0u8; 4];
        assert_eq!(read_attribute(&mut buf, 1, &[1]), Ok(0));
    }

    #[test]
    fn offset_past_end_is_rejected() {
        let mut buf = [0u8; 4];
        assert_eq!(
            read_attribute(&mut buf, 2, &[1]),
            Err(AttError::InvalidOffset)
        );
    }

    #[test]
    fn truncates_to_buffer() {
        let mut buf = [0u8; 2];
        assert_eq!(read_attribute(&mut buf, 1, &[1, 2, 3, 4]), Ok(2));
        assert_eq!(buf, [2, 3]);
    }
}
