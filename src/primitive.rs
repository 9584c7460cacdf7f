//! Primitive codecs: the byte-level encode/decode pairs every field kind is built from.
//!
//! Each pair is width-symmetric: whatever byte count the encoder emits for a value, the
//! decoder reconstructs the identical value from exactly that many bytes. For numbers that
//! symmetry is the wire format's core trick: the payload byte count between size markers is
//! the only record of whether a value traveled as an int8, int16, int32 or double.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result};

/// Bytes per code point for the string codecs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CharWidth {
    One,
    Two,
    Four,
}

impl CharWidth {
    pub(crate) fn bytes(self) -> usize {
        match self {
            CharWidth::One => 1,
            CharWidth::Two => 2,
            CharWidth::Four => 4,
        }
    }
}

/// Width policy for a number field: pick the minimal lossless width per value, or pin the
/// field to one width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NumberWidth {
    Minimal,
    Int8,
    Int16,
    Int32,
    Double,
}

pub(crate) fn encode_bool(buf: &mut Vec<u8>, v: bool) {
    buf.push(if v { 1 } else { 0 });
}

pub(crate) fn decode_bool(data: &[u8]) -> Result<bool> {
    match data.first() {
        Some(b) => Ok(*b != 0),
        None => Err(Error::LengthTooShort {
            step: "decode boolean",
            actual: 0,
            expected: 1,
        }),
    }
}

/// Serialize a number at the given width policy. Non-finite values are coerced to 0 rather
/// than rejected; that keeps the happy path allocation- and branch-light, and is the
/// documented lossy corner of the format.
pub(crate) fn encode_number(buf: &mut Vec<u8>, v: f64, width: NumberWidth) {
    let v = if v.is_finite() { v } else { 0.0 };
    match width {
        NumberWidth::Minimal => {
            if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
                let n = v as i32;
                if n >= i8::MIN as i32 && n <= i8::MAX as i32 {
                    buf.push(n as i8 as u8);
                } else if n >= i16::MIN as i32 && n <= i16::MAX as i32 {
                    buf.extend_from_slice(&(n as i16).to_be_bytes());
                } else {
                    buf.extend_from_slice(&n.to_be_bytes());
                }
            } else {
                buf.extend_from_slice(&v.to_bits().to_be_bytes());
            }
        }
        NumberWidth::Int8 => buf.push(v as i8 as u8),
        NumberWidth::Int16 => buf.extend_from_slice(&(v as i16).to_be_bytes()),
        NumberWidth::Int32 => buf.extend_from_slice(&(v as i32).to_be_bytes()),
        NumberWidth::Double => buf.extend_from_slice(&v.to_bits().to_be_bytes()),
    }
}

/// The payload byte count alone selects the decode rule; there is no type tag to consult.
pub(crate) fn decode_number(data: &[u8]) -> Result<f64> {
    match data.len() {
        1 => Ok(data[0] as i8 as f64),
        2 => Ok(BigEndian::read_i16(data) as f64),
        4 => Ok(BigEndian::read_i32(data) as f64),
        8 => Ok(f64::from_bits(BigEndian::read_u64(data))),
        len => Err(Error::BadEncode(format!(
            "number payload must be 1, 2, 4 or 8 bytes, got {}",
            len
        ))),
    }
}

/// One unsigned big-endian code unit per Unicode code point, no terminator. Code points that
/// don't fit the unit are masked to its low bits, trading range for density.
pub(crate) fn encode_str(buf: &mut Vec<u8>, v: &str, width: CharWidth) {
    for c in v.chars() {
        let u = c as u32;
        match width {
            CharWidth::One => buf.push(u as u8),
            CharWidth::Two => buf.extend_from_slice(&(u as u16).to_be_bytes()),
            CharWidth::Four => buf.extend_from_slice(&u.to_be_bytes()),
        }
    }
}

/// Units that aren't valid scalar values (possible only for masked-down input) decode to
/// U+FFFD. A trailing partial unit is ignored.
pub(crate) fn decode_str(data: &[u8], width: CharWidth) -> String {
    let unit = width.bytes();
    let mut s = String::with_capacity(data.len() / unit);
    for chunk in data.chunks_exact(unit) {
        let u = match width {
            CharWidth::One => chunk[0] as u32,
            CharWidth::Two => BigEndian::read_u16(chunk) as u32,
            CharWidth::Four => BigEndian::read_u32(chunk),
        };
        s.push(char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER));
    }
    s
}

/// Fit the payload written at `buf[start..]` to exactly `size` bytes: truncate the excess, or
/// zero-pad on the right.
pub(crate) fn fit_width(buf: &mut Vec<u8>, start: usize, size: usize) {
    if buf.len() - start > size {
        buf.truncate(start + size);
    } else {
        buf.resize(start + size, 0);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn enc(v: f64) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_number(&mut buf, v, NumberWidth::Minimal);
        buf
    }

    mod boolean {
        use super::*;

        #[test]
        fn roundtrip() {
            for v in [true, false] {
                let mut buf = Vec::new();
                encode_bool(&mut buf, v);
                assert_eq!(buf.len(), 1);
                assert_eq!(decode_bool(&buf).unwrap(), v);
            }
        }

        #[test]
        fn spec() {
            let mut buf = Vec::new();
            encode_bool(&mut buf, true);
            encode_bool(&mut buf, false);
            assert_eq!(buf, &[1, 0]);
        }

        #[test]
        fn empty_payload() {
            assert!(decode_bool(&[]).is_err());
        }
    }

    mod number {
        use super::*;

        #[test]
        fn minimal_width_selection() {
            // Width boundaries, both signs
            assert_eq!(enc(0.0).len(), 1);
            assert_eq!(enc(127.0).len(), 1);
            assert_eq!(enc(-128.0).len(), 1);
            assert_eq!(enc(128.0).len(), 2);
            assert_eq!(enc(-129.0).len(), 2);
            assert_eq!(enc(32767.0).len(), 2);
            assert_eq!(enc(-32768.0).len(), 2);
            assert_eq!(enc(32768.0).len(), 4);
            assert_eq!(enc(-32769.0).len(), 4);
            assert_eq!(enc(2147483647.0).len(), 4);
            assert_eq!(enc(-2147483648.0).len(), 4);
            assert_eq!(enc(2147483648.0).len(), 8);
            assert_eq!(enc(-2147483649.0).len(), 8);
            assert_eq!(enc(0.5).len(), 8);
            assert_eq!(enc(-0.1).len(), 8);
        }

        #[test]
        fn roundtrip() {
            let cases = [
                0.0, 1.0, -1.0, 127.0, -128.0, 128.0, -129.0, 32767.0, -32768.0, 32768.0,
                2147483647.0, -2147483648.0, 2147483648.0, 1e15, -1e15, 0.1, -0.1, 3.1415926,
                f64::MAX, f64::MIN, 5e-324,
            ];
            for case in cases {
                let buf = enc(case);
                assert_eq!(decode_number(&buf).unwrap(), case, "case {}", case);
            }
        }

        #[test]
        fn spec() {
            assert_eq!(enc(1.0), &[0x01]);
            assert_eq!(enc(-1.0), &[0xff]);
            assert_eq!(enc(127.0), &[0x7f]);
            assert_eq!(enc(-128.0), &[0x80]);
            assert_eq!(enc(128.0), &[0x00, 0x80]);
            assert_eq!(enc(-129.0), &[0xff, 0x7f]);
            assert_eq!(enc(2147483647.0), &[0x7f, 0xff, 0xff, 0xff]);
            assert_eq!(enc(0.5), &[0x3f, 0xe0, 0, 0, 0, 0, 0, 0]);
        }

        #[test]
        fn non_finite_coerces_to_zero() {
            assert_eq!(enc(f64::NAN), &[0x00]);
            assert_eq!(enc(f64::INFINITY), &[0x00]);
            assert_eq!(enc(f64::NEG_INFINITY), &[0x00]);
        }

        #[test]
        fn pinned_widths() {
            let mut buf = Vec::new();
            encode_number(&mut buf, 5.0, NumberWidth::Int32);
            assert_eq!(buf, &[0, 0, 0, 5]);

            let mut buf = Vec::new();
            encode_number(&mut buf, 2.0, NumberWidth::Double);
            assert_eq!(buf.len(), 8);
            assert_eq!(decode_number(&buf).unwrap(), 2.0);

            // Out-of-range values saturate at the pinned width
            let mut buf = Vec::new();
            encode_number(&mut buf, 300.0, NumberWidth::Int8);
            assert_eq!(buf, &[0x7f]);
            let mut buf = Vec::new();
            encode_number(&mut buf, -40000.0, NumberWidth::Int16);
            assert_eq!(decode_number(&buf).unwrap(), -32768.0);
        }

        #[test]
        fn rejects_bad_widths() {
            assert!(decode_number(&[]).is_err());
            assert!(decode_number(&[0, 0, 0]).is_err());
            assert!(decode_number(&[0; 5]).is_err());
        }
    }

    mod string {
        use super::*;

        #[test]
        fn roundtrip_widths() {
            for width in [CharWidth::One, CharWidth::Two, CharWidth::Four] {
                let mut buf = Vec::new();
                encode_str(&mut buf, "hello", width);
                assert_eq!(buf.len(), 5 * width.bytes());
                assert_eq!(decode_str(&buf, width), "hello");
            }
        }

        #[test]
        fn spec() {
            let mut buf = Vec::new();
            encode_str(&mut buf, "ab", CharWidth::Two);
            assert_eq!(buf, &[0x00, 0x61, 0x00, 0x62]);

            let mut buf = Vec::new();
            encode_str(&mut buf, "ab", CharWidth::One);
            assert_eq!(buf, &[0x61, 0x62]);
        }

        #[test]
        fn multibyte() {
            // U+00E9 fits a single byte unit; U+4E16/U+754C need two
            let mut buf = Vec::new();
            encode_str(&mut buf, "café", CharWidth::One);
            assert_eq!(buf, &[0x63, 0x61, 0x66, 0xe9]);
            assert_eq!(decode_str(&buf, CharWidth::One), "café");

            let mut buf = Vec::new();
            encode_str(&mut buf, "世界", CharWidth::Two);
            assert_eq!(decode_str(&buf, CharWidth::Two), "世界");

            let mut buf = Vec::new();
            encode_str(&mut buf, "🦀🦀", CharWidth::Four);
            assert_eq!(buf.len(), 8);
            assert_eq!(decode_str(&buf, CharWidth::Four), "🦀🦀");
        }

        #[test]
        fn narrow_units_mask() {
            // U+1F980 masked to 16 bits is U+F980, not the crab
            let mut buf = Vec::new();
            encode_str(&mut buf, "🦀", CharWidth::Two);
            assert_eq!(buf, &[0xf9, 0x80]);
            assert_eq!(decode_str(&buf, CharWidth::Two), "\u{f980}");
        }
    }

    mod fixed_width {
        use super::*;

        #[test]
        fn pads_and_truncates() {
            let mut buf = vec![0xaa];
            buf.extend_from_slice(&[1, 2, 3]);
            fit_width(&mut buf, 1, 5);
            assert_eq!(buf, &[0xaa, 1, 2, 3, 0, 0]);

            let mut buf = vec![0xaa];
            buf.extend_from_slice(&[1, 2, 3]);
            fit_width(&mut buf, 1, 2);
            assert_eq!(buf, &[0xaa, 1, 2]);
        }
    }
}
