/// CBOR serialization of the compiled system.
///
/// The wire format is every public field of `R1cs` in declaration order,
/// the coefficient table last. Field elements are encoded as canonical
/// (non-Montgomery) 32-byte little-endian strings, so the bytes never
/// depend on the iteration order of any container. Derived state (the
/// wire -> hint map, the log sink) is rebuilt after decoding.

use std::fmt;
use std::io::{self, Read, Write};

use ark_bn254::Fr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::r1cs::R1cs;

/// Decoded sequences longer than this are rejected, bounding the memory a
/// hostile payload can claim.
pub const MAX_SEQUENCE_ELEMENTS: usize = 1 << 27;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum SerializeError {
    Io(io::Error),
    /// The encoder rejected a value.
    Encode(String),
    /// The payload is not a valid encoding of a compiled system.
    Decode(String),
    /// A decoded sequence exceeds `MAX_SEQUENCE_ELEMENTS`.
    SequenceTooLong { len: usize, max: usize },
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeError::Io(e) => write!(f, "i/o error: {e}"),
            SerializeError::Encode(msg) => write!(f, "encode error: {msg}"),
            SerializeError::Decode(msg) => write!(f, "decode error: {msg}"),
            SerializeError::SequenceTooLong { len, max } => {
                write!(f, "decoded sequence of {len} elements exceeds the cap of {max}")
            }
        }
    }
}

impl std::error::Error for SerializeError {}

impl From<io::Error> for SerializeError {
    fn from(e: io::Error) -> SerializeError {
        SerializeError::Io(e)
    }
}

// ============================================================================
// Counting reader / writer
// ============================================================================

struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct CountingReader<R> {
    inner: R,
    read: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        Ok(n)
    }
}

// ============================================================================
// write_to / read_from
// ============================================================================

impl R1cs {
    /// Encode the system into `w` as CBOR. Returns the number of bytes
    /// written.
    pub fn write_to<W: Write>(&self, w: W) -> Result<u64, SerializeError> {
        let mut counter = CountingWriter { inner: w, written: 0 };
        ciborium::into_writer(self, &mut counter).map_err(|e| match e {
            ciborium::ser::Error::Io(e) => SerializeError::Io(e),
            other => SerializeError::Encode(other.to_string()),
        })?;
        Ok(counter.written)
    }

    /// Decode a system from `r` and rebuild the wire -> hint map. Returns
    /// the system and the number of bytes read. The log sink resets to the
    /// default.
    pub fn read_from<R: Read>(r: R) -> Result<(R1cs, u64), SerializeError> {
        let mut counter = CountingReader { inner: r, read: 0 };
        let mut cs: R1cs = ciborium::from_reader(&mut counter).map_err(|e| match e {
            ciborium::de::Error::Io(e) => SerializeError::Io(e),
            other => SerializeError::Decode(other.to_string()),
        })?;
        cs.check_sequence_lengths()?;
        cs.init_hints();
        Ok((cs, counter.read))
    }

    fn check_sequence_lengths(&self) -> Result<(), SerializeError> {
        fn check(len: usize) -> Result<(), SerializeError> {
            if len > MAX_SEQUENCE_ELEMENTS {
                return Err(SerializeError::SequenceTooLong {
                    len,
                    max: MAX_SEQUENCE_ELEMENTS,
                });
            }
            Ok(())
        }

        check(self.constraints.len())?;
        check(self.coefficients.len())?;
        check(self.hints.len())?;
        check(self.logs.len())?;
        check(self.debug_info_computation.len())?;
        check(self.debug_info_assertion.len())?;
        for c in &self.constraints {
            check(c.l.len())?;
            check(c.r.len())?;
            check(c.o.len())?;
        }
        for h in &self.hints {
            check(h.inputs.len())?;
            for input in &h.inputs {
                check(input.len())?;
            }
        }
        for entry in self
            .logs
            .iter()
            .chain(&self.debug_info_computation)
            .chain(&self.debug_info_assertion)
        {
            check(entry.to_resolve.len())?;
        }
        Ok(())
    }
}

// ============================================================================
// Field element <-> canonical bytes
// ============================================================================

/// Serde adapter for `Vec<Fr>`: each element becomes a 32-byte canonical
/// little-endian byte string. Used with `#[serde(with = "...")]` on the
/// coefficient table.
pub(crate) mod fr_vec {
    use super::*;
    use serde::de::{Error as DeError, SeqAccess, Visitor};
    use serde::ser::{Error as SerError, SerializeSeq};
    use serde::{Deserializer, Serializer};

    struct FrBytes(Fr);

    impl serde::Serialize for FrBytes {
        fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
            let mut bytes = [0u8; 32];
            self.0
                .serialize_compressed(&mut bytes[..])
                .map_err(|e| S::Error::custom(format!("field element encoding: {e}")))?;
            s.serialize_bytes(&bytes)
        }
    }

    impl<'de> serde::Deserialize<'de> for FrBytes {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<FrBytes, D::Error> {
            struct BytesVisitor;

            impl<'de> Visitor<'de> for BytesVisitor {
                type Value = FrBytes;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a 32-byte canonical field element")
                }

                fn visit_bytes<E: DeError>(self, v: &[u8]) -> Result<FrBytes, E> {
                    if v.len() != 32 {
                        return Err(E::invalid_length(v.len(), &self));
                    }
                    let fr = Fr::deserialize_compressed(v)
                        .map_err(|e| E::custom(format!("field element decoding: {e}")))?;
                    Ok(FrBytes(fr))
                }

                fn visit_byte_buf<E: DeError>(self, v: Vec<u8>) -> Result<FrBytes, E> {
                    self.visit_bytes(&v)
                }
            }

            d.deserialize_bytes(BytesVisitor)
        }
    }

    pub fn serialize<S: Serializer>(v: &[Fr], s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(v.len()))?;
        for e in v {
            seq.serialize_element(&FrBytes(*e))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Fr>, D::Error> {
        struct VecVisitor;

        impl<'de> Visitor<'de> for VecVisitor {
            type Value = Vec<Fr>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sequence of canonical field elements")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Vec<Fr>, A::Error> {
                let mut out = Vec::new();
                while let Some(FrBytes(fr)) = seq.next_element()? {
                    if out.len() >= MAX_SEQUENCE_ELEMENTS {
                        return Err(A::Error::custom("coefficient table exceeds decode cap"));
                    }
                    out.push(fr);
                }
                Ok(out)
            }
        }

        d.deserialize_seq(VecVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{One, Zero};

    #[test]
    fn test_counting_writer_counts() {
        let mut out = Vec::new();
        let mut w = CountingWriter { inner: &mut out, written: 0 };
        w.write_all(b"abcde").unwrap();
        assert_eq!(w.written, 5);
        assert_eq!(out, b"abcde");
    }

    #[test]
    fn test_counting_reader_counts() {
        let data = b"abcdef";
        let mut r = CountingReader { inner: &data[..], read: 0 };
        let mut buf = [0u8; 4];
        r.read_exact(&mut buf).unwrap();
        assert_eq!(r.read, 4);
    }

    #[test]
    fn test_empty_system_roundtrip() {
        let cs = R1cs::new(1, 0, 0, 0, Vec::new(), vec![
            Fr::zero(),
            Fr::one(),
            Fr::from(2u64),
            -Fr::one(),
        ]);
        let mut bytes = Vec::new();
        let written = cs.write_to(&mut bytes).unwrap();
        assert_eq!(written, bytes.len() as u64);

        let (decoded, read) = R1cs::read_from(&bytes[..]).unwrap();
        assert_eq!(read, bytes.len() as u64);
        assert_eq!(decoded, cs);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = R1cs::read_from(&b"not cbor at all"[..]).unwrap_err();
        assert!(matches!(err, SerializeError::Decode(_) | SerializeError::Io(_)));
    }
}
