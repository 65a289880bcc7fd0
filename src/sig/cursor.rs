//! L1: the Signature Cursor walks a D-Bus type signature one complete
//! type at a time, enforcing the grammar and the 32-level nesting cap
//! that the assumed `dbus` crate does not check itself.
//!
//! Grounded on `generate/types.rs::xml_to_rust_type`'s byte-cursor
//! recursion, pulled out into a standalone, non-allocating walker so the
//! Type Mapper (`sig::mapper`) can be written against a clean interface
//! instead of re-deriving cursor bookkeeping itself.

use crate::error::{Error, Result};

const MAX_NESTING: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicType {
    Byte,
    Boolean,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    String,
    ObjectPath,
    Signature,
    UnixFd,
}

impl BasicType {
    fn from_code(c: u8) -> Option<BasicType> {
        use BasicType::*;
        Some(match c {
            b'y' => Byte,
            b'b' => Boolean,
            b'n' => Int16,
            b'q' => UInt16,
            b'i' => Int32,
            b'u' => UInt32,
            b'x' => Int64,
            b't' => UInt64,
            b'd' => Double,
            b's' => String,
            b'o' => ObjectPath,
            b'g' => Signature,
            b'h' => UnixFd,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    Basic(BasicType),
    Variant,
    Array,
    Struct,
    DictEntry,
    End,
}

/// A cursor over one nesting level of a signature. `recurse` hands back
/// a child cursor over the contents of a container type.
#[derive(Debug, Clone)]
pub struct SignatureCursor<'a> {
    full: &'a str,
    bytes: &'a [u8],
    pos: usize,
    end: usize,
    depth: u32,
}

impl<'a> SignatureCursor<'a> {
    /// Validates `sig` against the D-Bus signature grammar (including the
    /// 32-level nesting cap) and returns a cursor positioned at its
    /// first type.
    pub fn new(sig: &'a str) -> Result<Self> {
        let bytes = sig.as_bytes();
        validate(sig, bytes, 0, bytes.len(), 0)?;
        Ok(SignatureCursor {
            full: sig,
            bytes,
            pos: 0,
            end: bytes.len(),
            depth: 0,
        })
    }

    fn slice(&self) -> &'a [u8] {
        &self.bytes[self.pos..self.end]
    }

    /// The type code at the current position, or `End` if this cursor has
    /// been fully consumed.
    pub fn current_type(&self) -> TypeCode {
        match self.slice().first() {
            None => TypeCode::End,
            Some(b'v') => TypeCode::Variant,
            Some(b'a') => {
                if self.slice().get(1) == Some(&b'{') {
                    TypeCode::DictEntry
                } else {
                    TypeCode::Array
                }
            }
            Some(b'(') => TypeCode::Struct,
            Some(&c) => TypeCode::Basic(
                BasicType::from_code(c).expect("validated signature has only known codes"),
            ),
        }
    }

    /// The raw signature text of the complete type at the current
    /// position (e.g. `"a{sv}"`, `"(ii)"`, `"s"`).
    pub fn current_signature(&self) -> &'a str {
        let len = complete_type_len(self.slice());
        std::str::from_utf8(&self.slice()[..len]).unwrap()
    }

    /// For container types, a cursor over the contained type(s): one
    /// element type for an array, all field types for a struct, exactly
    /// key then value for a dict entry. `None` for basic types, variants,
    /// and `End`.
    pub fn recurse(&self) -> Option<SignatureCursor<'a>> {
        match self.current_type() {
            TypeCode::Array => {
                let inner_start = self.pos + 1;
                let inner_len = complete_type_len(&self.bytes[inner_start..self.end]);
                Some(SignatureCursor {
                    full: self.full,
                    bytes: self.bytes,
                    pos: inner_start,
                    end: inner_start + inner_len,
                    depth: self.depth + 1,
                })
            }
            TypeCode::DictEntry => {
                // "a{" KEY VALUE "}" -- the value may itself contain a
                // nested "{...}", so the close brace must be found by
                // depth-counting, not by the first '}' byte.
                let inner_start = self.pos + 2;
                let close = inner_start + find_close(&self.bytes[inner_start..self.end], b'{', b'}');
                Some(SignatureCursor {
                    full: self.full,
                    bytes: self.bytes,
                    pos: inner_start,
                    end: close,
                    depth: self.depth + 1,
                })
            }
            TypeCode::Struct => {
                let inner_start = self.pos + 1;
                let close = matching_paren(&self.bytes[inner_start..self.end]) + inner_start;
                Some(SignatureCursor {
                    full: self.full,
                    bytes: self.bytes,
                    pos: inner_start,
                    end: close,
                    depth: self.depth + 1,
                })
            }
            _ => None,
        }
    }

    /// Moves past the complete type at the current position.
    pub fn advance(&mut self) {
        if self.pos >= self.end {
            return;
        }
        self.pos += complete_type_len(self.slice());
    }

    /// `true` once this cursor has no more types at its level.
    pub fn is_end(&self) -> bool {
        self.current_type() == TypeCode::End
    }
}

/// Byte length of the complete type starting at `s[0]`.
fn complete_type_len(s: &[u8]) -> usize {
    match s.first() {
        None => 0,
        Some(b'a') => {
            if s.get(1) == Some(&b'{') {
                2 + find_close(&s[2..], b'{', b'}') + 1
            } else {
                1 + complete_type_len(&s[1..])
            }
        }
        Some(b'(') => 1 + matching_paren(&s[1..]) + 1,
        Some(_) => 1,
    }
}

/// Offset of the `)` matching the `(` implicitly before `s[0]`.
fn matching_paren(s: &[u8]) -> usize {
    find_close(s, b'(', b')')
}

fn find_close(s: &[u8], open: u8, close: u8) -> usize {
    let mut depth = 1i32;
    let mut i = 0;
    while i < s.len() {
        match s[i] {
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    s.len()
}

fn validate(full: &str, bytes: &[u8], mut pos: usize, end: usize, depth: u32) -> Result<usize> {
    while pos < end {
        pos = validate_one(full, bytes, pos, end, depth)?;
    }
    Ok(pos)
}

fn validate_one(full: &str, bytes: &[u8], pos: usize, end: usize, depth: u32) -> Result<usize> {
    if depth > MAX_NESTING {
        return Err(Error::InvalidSignature {
            signature: full.to_string(),
            offset: pos,
        });
    }
    let err = || Error::InvalidSignature {
        signature: full.to_string(),
        offset: pos,
    };
    match bytes.get(pos).copied() {
        None => Err(err()),
        Some(b'v') => Ok(pos + 1),
        Some(b'a') => {
            if bytes.get(pos + 1) == Some(&b'{') {
                let key_pos = pos + 2;
                let key = *bytes.get(key_pos).ok_or_else(err)?;
                if BasicType::from_code(key).is_none() {
                    return Err(err());
                }
                let val_pos = validate_one(full, bytes, key_pos + 1, end, depth + 1)?;
                if bytes.get(val_pos) != Some(&b'}') {
                    return Err(err());
                }
                Ok(val_pos + 1)
            } else {
                validate_one(full, bytes, pos + 1, end, depth + 1)
            }
        }
        Some(b'(') => {
            let mut p = pos + 1;
            if bytes.get(p) == Some(&b')') {
                return Err(err());
            }
            while bytes.get(p) != Some(&b')') {
                if p >= end {
                    return Err(err());
                }
                p = validate_one(full, bytes, p, end, depth + 1)?;
            }
            Ok(p + 1)
        }
        Some(c) if BasicType::from_code(c).is_some() => Ok(pos + 1),
        Some(_) => Err(err()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(sig: &str) -> Vec<TypeCode> {
        let mut c = SignatureCursor::new(sig).unwrap();
        let mut v = vec![];
        while !c.is_end() {
            v.push(c.current_type());
            c.advance();
        }
        v
    }

    #[test]
    fn basics() {
        assert_eq!(codes("s"), vec![TypeCode::Basic(BasicType::String)]);
        assert_eq!(
            codes("si"),
            vec![
                TypeCode::Basic(BasicType::String),
                TypeCode::Basic(BasicType::Int32)
            ]
        );
    }

    #[test]
    fn array_of_string() {
        let mut c = SignatureCursor::new("as").unwrap();
        assert_eq!(c.current_type(), TypeCode::Array);
        let inner = c.recurse().unwrap();
        assert_eq!(inner.current_type(), TypeCode::Basic(BasicType::String));
    }

    #[test]
    fn dict_a_sv() {
        let mut c = SignatureCursor::new("a{sv}").unwrap();
        assert_eq!(c.current_type(), TypeCode::DictEntry);
        let mut inner = c.recurse().unwrap();
        assert_eq!(inner.current_type(), TypeCode::Basic(BasicType::String));
        inner.advance();
        assert_eq!(inner.current_type(), TypeCode::Variant);
        inner.advance();
        assert!(inner.is_end());
    }

    #[test]
    fn nested_struct() {
        let mut c = SignatureCursor::new("(aia{sv})").unwrap();
        assert_eq!(c.current_type(), TypeCode::Struct);
        let mut fields = c.recurse().unwrap();
        assert_eq!(fields.current_type(), TypeCode::Array);
        fields.advance();
        assert_eq!(fields.current_type(), TypeCode::DictEntry);
        fields.advance();
        assert!(fields.is_end());
    }

    #[test]
    fn signature_text_roundtrip() {
        let c = SignatureCursor::new("a(si)").unwrap();
        assert_eq!(c.current_signature(), "a(si)");
    }

    #[test]
    fn too_deep_rejected() {
        let mut sig = String::new();
        for _ in 0..33 {
            sig.push('a');
        }
        sig.push('y');
        assert!(SignatureCursor::new(&sig).is_err());
    }

    #[test]
    fn unclosed_struct_rejected() {
        assert!(SignatureCursor::new("(ii").is_err());
    }

    #[test]
    fn empty_struct_rejected() {
        assert!(SignatureCursor::new("()").is_err());
    }
}
