//! Periodic image flag packing.
//!
//! The engine stores each atom's three periodic image counts packed into one
//! integer: 10 bits per dimension, biased by 512 so that the centered image
//! `(0, 0, 0)` encodes to `(512 << 20) | (512 << 10) | 512` = 537395712.
//! Encode and decode are mutual inverses over the representable range
//! `[-512, 511]` per dimension.

use crate::error::{Error, Result, ValidationError};

const IMG_BITS: i32 = 10;
const IMG2_BITS: i32 = 2 * IMG_BITS;
const IMG_MASK: i32 = (1 << IMG_BITS) - 1;
const IMG_MAX: i32 = 1 << (IMG_BITS - 1);

/// Pack three per-dimension image counts into the engine's integer encoding.
///
/// Each flag must be in `[-512, 511]`; out-of-range flags fail validation.
pub fn encode_image_flags(flags: [i32; 3]) -> Result<i32> {
    for &flag in &flags {
        if !(-IMG_MAX..IMG_MAX).contains(&flag) {
            return Err(Error::Validation(ValidationError::ImageFlagOutOfRange {
                flag,
            }));
        }
    }
    let [ix, iy, iz] = flags;
    Ok(((iz + IMG_MAX) << IMG2_BITS) | ((iy + IMG_MAX) << IMG_BITS) | (ix + IMG_MAX))
}

/// Unpack the engine's integer encoding into three image counts.
pub fn decode_image_flags(image: i32) -> [i32; 3] {
    [
        (image & IMG_MASK) - IMG_MAX,
        ((image >> IMG_BITS) & IMG_MASK) - IMG_MAX,
        ((image >> IMG2_BITS) & IMG_MASK) - IMG_MAX,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn centered_sentinel() {
        assert_eq!(encode_image_flags([0, 0, 0]).unwrap(), 537_395_712);
        assert_eq!(decode_image_flags(537_395_712), [0, 0, 0]);
    }

    #[test]
    fn axis_separation() {
        let img = encode_image_flags([1, -2, 3]).unwrap();
        assert_eq!(decode_image_flags(img), [1, -2, 3]);
    }

    #[test]
    fn range_limits() {
        assert!(encode_image_flags([-512, 511, 0]).is_ok());
        assert!(encode_image_flags([512, 0, 0]).is_err());
        assert!(encode_image_flags([0, -513, 0]).is_err());
    }

    proptest! {
        #[test]
        fn encode_decode_inverse(
            ix in -512i32..512,
            iy in -512i32..512,
            iz in -512i32..512,
        ) {
            let img = encode_image_flags([ix, iy, iz]).unwrap();
            prop_assert_eq!(decode_image_flags(img), [ix, iy, iz]);
        }
    }
}
