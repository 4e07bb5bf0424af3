//! Typed record values stored at the leaves of the index.

use bytes::Bytes;

/// Tag identifying the value carried by a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordKind {
    Char = 0,
    Int = 1,
    Float = 2,
    Data = 3,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordKind::Char => "CHAR",
            RecordKind::Int => "INT",
            RecordKind::Float => "FLOAT",
            RecordKind::Data => "DATA",
        };
        write!(f, "{}", name)
    }
}

/// The value a key maps to.
///
/// A record is created by the caller and handed to the tree at
/// insertion; from then on the tree owns it and releases it on delete
/// or purge. `Data` records carry an opaque byte payload; the tree
/// invokes the configured release hook on that payload when the record
/// leaves the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Char(char),
    Int(i32),
    Float(f32),
    Data(Bytes),
}

impl Record {
    /// Creates a `Data` record from anything convertible to [`Bytes`].
    pub fn data(payload: impl Into<Bytes>) -> Self {
        Record::Data(payload.into())
    }

    /// Returns the kind tag for this record.
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Char(_) => RecordKind::Char,
            Record::Int(_) => RecordKind::Int,
            Record::Float(_) => RecordKind::Float,
            Record::Data(_) => RecordKind::Data,
        }
    }

    /// Payload size in bytes. Only `Data` records carry a size.
    pub fn size(&self) -> Option<usize> {
        match self {
            Record::Data(bytes) => Some(bytes.len()),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Record::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Record::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Record::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Record::Data(bytes) => Some(bytes.as_ref()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Record::Char(c) => write!(f, "{}", c),
            Record::Int(i) => write!(f, "{}", i),
            Record::Float(x) => write!(f, "{}", x),
            Record::Data(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(Record::Char('a').kind(), RecordKind::Char);
        assert_eq!(Record::Int(7).kind(), RecordKind::Int);
        assert_eq!(Record::Float(1.5).kind(), RecordKind::Float);
        assert_eq!(Record::data(vec![1, 2, 3]).kind(), RecordKind::Data);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RecordKind::Char.to_string(), "CHAR");
        assert_eq!(RecordKind::Int.to_string(), "INT");
        assert_eq!(RecordKind::Float.to_string(), "FLOAT");
        assert_eq!(RecordKind::Data.to_string(), "DATA");
    }

    #[test]
    fn test_size_only_for_data() {
        assert_eq!(Record::Char('x').size(), None);
        assert_eq!(Record::Int(0).size(), None);
        assert_eq!(Record::Float(0.0).size(), None);
        assert_eq!(Record::data(vec![0u8; 16]).size(), Some(16));
        assert_eq!(Record::data(Vec::new()).size(), Some(0));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Record::Char('q').as_char(), Some('q'));
        assert_eq!(Record::Int(-34).as_int(), Some(-34));
        assert_eq!(Record::Float(2.25).as_float(), Some(2.25));
        assert_eq!(Record::data(vec![9, 9]).as_data(), Some(&[9u8, 9][..]));

        assert_eq!(Record::Int(1).as_char(), None);
        assert_eq!(Record::Char('a').as_int(), None);
        assert_eq!(Record::Int(1).as_data(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Record::Char('z').to_string(), "z");
        assert_eq!(Record::Int(768).to_string(), "768");
        assert_eq!(Record::data(vec![0u8; 4]).to_string(), "<4 bytes>");
    }

    #[test]
    fn test_data_from_static() {
        let rec = Record::data(&b"payload"[..]);
        assert_eq!(rec.as_data(), Some(&b"payload"[..]));
        assert_eq!(rec.size(), Some(7));
    }
}
