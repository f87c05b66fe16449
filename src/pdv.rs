//! EXTERNAL, EMBEDDED PDV, and CHARACTER STRING values.
//!
//! These three composite types all embed a data value produced under some
//! other syntax together with an [`Identification`] describing which
//! syntax that is. EXTERNAL uses its own pre-1994 wire form, a SEQUENCE of
//! the syntax references followed by an encoding CHOICE. EMBEDDED PDV and
//! CHARACTER STRING share one shape: a SEQUENCE of the explicitly tagged
//! identification CHOICE and the data value octets.
//!
//! Under CER and DER, the `presentation-context-id` and
//! `context-negotiation` identification alternatives are not available;
//! the encoders quietly degrade them to `fixed`. EXTERNAL under CER and
//! DER must carry a direct reference.

use bytes::Bytes;
use crate::element::Element;
use crate::error::{DecodeError, ErrorKind};
use crate::int::Integer;
use crate::mode::Mode;
use crate::oid::Oid;
use crate::string::BitString;
use crate::tag::{Class, Tag};


//------------ Identification ------------------------------------------------

/// The identification CHOICE shared by the context-switching types.
///
/// The variant describes how the abstract and transfer syntax of the
/// embedded data value are communicated to the receiver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Identification {
    /// Abstract and transfer syntax are both named by object identifiers.
    Syntaxes {
        /// The abstract syntax of the data value.
        abstract_syntax: Oid,

        /// The transfer syntax the data value is encoded in.
        transfer_syntax: Oid,
    },

    /// A single object identifier names both syntaxes.
    Syntax(Oid),

    /// The syntaxes were agreed upon via the presentation context.
    PresentationContextId(Integer),

    /// The syntaxes were negotiated out of band for a presentation
    /// context.
    ContextNegotiation {
        /// The presentation context in question.
        presentation_context_id: Integer,

        /// The transfer syntax the data value is encoded in.
        transfer_syntax: Oid,
    },

    /// Only the transfer syntax is named.
    TransferSyntax(Oid),

    /// The syntaxes are fixed by the application.
    Fixed,
}

impl Identification {
    /// Decodes the identification from its CHOICE element.
    fn from_element(elem: &Element) -> Result<Self, DecodeError> {
        if elem.class() != Class::Context {
            return Err(DecodeError::new(
                ErrorKind::TagClass,
                "expected context-specific identification tag", 0,
            ))
        }
        match elem.number() {
            0 => {
                let children = elem.children()?;
                let [abstract_elem, transfer_elem] = children.as_slice()
                else {
                    return Err(DecodeError::new(
                        ErrorKind::ValueSize,
                        "syntaxes must hold two components", 0,
                    ))
                };
                expect_tag(abstract_elem, Tag::ctx(0))?;
                expect_tag(transfer_elem, Tag::ctx(1))?;
                Ok(Identification::Syntaxes {
                    abstract_syntax: abstract_elem.to_oid()?,
                    transfer_syntax: transfer_elem.to_oid()?,
                })
            }
            1 => elem.to_oid().map(Identification::Syntax),
            2 => {
                elem.to_integer().map(Identification::PresentationContextId)
            }
            3 => {
                let children = elem.children()?;
                let [id_elem, transfer_elem] = children.as_slice() else {
                    return Err(DecodeError::new(
                        ErrorKind::ValueSize,
                        "context-negotiation must hold two components", 0,
                    ))
                };
                expect_tag(id_elem, Tag::ctx(0))?;
                expect_tag(transfer_elem, Tag::ctx(1))?;
                Ok(Identification::ContextNegotiation {
                    presentation_context_id: id_elem.to_integer()?,
                    transfer_syntax: transfer_elem.to_oid()?,
                })
            }
            4 => elem.to_oid().map(Identification::TransferSyntax),
            5 => {
                elem.to_null()?;
                Ok(Identification::Fixed)
            }
            _ => {
                Err(DecodeError::new(
                    ErrorKind::TagNumber,
                    "unknown identification alternative", 0,
                ))
            }
        }
    }

    /// Encodes the identification as its CHOICE element.
    ///
    /// Under CER and DER, the `presentation-context-id` and
    /// `context-negotiation` alternatives degrade to `fixed`.
    fn to_element(&self, mode: Mode) -> Element {
        if mode.is_restricted() && matches!(
            self,
            Identification::PresentationContextId(_)
                | Identification::ContextNegotiation { .. }
        ) {
            return Identification::Fixed.to_element(mode)
        }
        match self {
            Identification::Syntaxes {
                abstract_syntax, transfer_syntax
            } => {
                let mut abstract_elem = Element::new(mode, Tag::ctx(0));
                abstract_elem.set_oid(abstract_syntax);
                let mut transfer_elem = Element::new(mode, Tag::ctx(1));
                transfer_elem.set_oid(transfer_syntax);
                let mut res = Element::new(mode, Tag::ctx(0));
                res.set_children(&[abstract_elem, transfer_elem]);
                res
            }
            Identification::Syntax(oid) => {
                let mut res = Element::new(mode, Tag::ctx(1));
                res.set_oid(oid);
                res
            }
            Identification::PresentationContextId(id) => {
                let mut res = Element::new(mode, Tag::ctx(2));
                res.set_integer(id);
                res
            }
            Identification::ContextNegotiation {
                presentation_context_id, transfer_syntax
            } => {
                let mut id_elem = Element::new(mode, Tag::ctx(0));
                id_elem.set_integer(presentation_context_id);
                let mut transfer_elem = Element::new(mode, Tag::ctx(1));
                transfer_elem.set_oid(transfer_syntax);
                let mut res = Element::new(mode, Tag::ctx(3));
                res.set_children(&[id_elem, transfer_elem]);
                res
            }
            Identification::TransferSyntax(oid) => {
                let mut res = Element::new(mode, Tag::ctx(4));
                res.set_oid(oid);
                res
            }
            Identification::Fixed => {
                let mut res = Element::new(mode, Tag::ctx(5));
                res.set_null();
                res
            }
        }
    }
}


//------------ EmbeddedPdv ---------------------------------------------------

/// An EMBEDDED PDV value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmbeddedPdv {
    /// How the embedded data value is encoded.
    pub identification: Identification,

    /// The embedded data value itself.
    pub data_value: Bytes,
}


//------------ CharacterString -----------------------------------------------

/// A CHARACTER STRING value.
///
/// This is the unrestricted character string type: the characters are
/// encoded under whatever syntax the identification names, so the value
/// octets are kept as they are.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CharacterString {
    /// How the string value is encoded.
    pub identification: Identification,

    /// The octets of the encoded characters.
    pub string_value: Bytes,
}


//------------ External ------------------------------------------------------

/// An EXTERNAL value in its pre-1994 wire form.
///
/// At least one of the two syntax references must be present; CER and DER
/// insist on the direct reference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct External {
    /// The object identifier naming the syntax of the data value.
    pub direct_reference: Option<Oid>,

    /// A presentation context number agreed upon out of band.
    pub indirect_reference: Option<Integer>,

    /// The octets of the ObjectDescriptor describing the data value.
    pub data_value_descriptor: Option<Bytes>,

    /// The data value itself.
    pub encoding: ExternalEncoding,
}

/// The encoding CHOICE of an EXTERNAL value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExternalEncoding {
    /// The data value is a single encoded ASN.1 value.
    SingleAsn1Type(Element),

    /// The data value is an octet aligned bit stream.
    OctetAligned(Bytes),

    /// The data value is a bit stream of arbitrary length.
    Arbitrary(BitString),
}


//============ Element Accessors =============================================

/// # EXTERNAL, EMBEDDED PDV, and CHARACTER STRING
///
impl Element {
    /// Returns the value of an EXTERNAL element.
    pub fn to_external(&self) -> Result<External, DecodeError> {
        let children = self.children()?;
        let mut iter = children.iter().peekable();

        let mut direct_reference = None;
        if let Some(child) = iter.peek() {
            if child.tag() == Tag::OID {
                direct_reference = Some(child.to_oid()?);
                iter.next();
            }
        }
        let mut indirect_reference = None;
        if let Some(child) = iter.peek() {
            if child.tag() == Tag::INTEGER {
                indirect_reference = Some(child.to_integer()?);
                iter.next();
            }
        }
        let mut data_value_descriptor = None;
        if let Some(child) = iter.peek() {
            if child.tag() == Tag::OBJECT_DESCRIPTOR {
                data_value_descriptor = Some(
                    child.string_content(Tag::OCTET_STRING)?
                );
                iter.next();
            }
        }
        if direct_reference.is_none() && indirect_reference.is_none() {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid,
                "EXTERNAL without a syntax reference", 0,
            ))
        }
        if self.mode().is_restricted() && direct_reference.is_none() {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid,
                "EXTERNAL without a direct reference in CER/DER mode", 0,
            ))
        }

        let Some(encoding_elem) = iter.next() else {
            return Err(DecodeError::new(
                ErrorKind::ValueSize,
                "EXTERNAL without an encoding component", 0,
            ))
        };
        if iter.next().is_some() {
            return Err(DecodeError::new(
                ErrorKind::ValueSize, "trailing components in EXTERNAL", 0,
            ))
        }
        if encoding_elem.class() != Class::Context {
            return Err(DecodeError::new(
                ErrorKind::TagClass,
                "expected context-specific encoding tag", 0,
            ))
        }
        let encoding = match encoding_elem.number() {
            0 => {
                let children = encoding_elem.children()?;
                let [inner] = children.as_slice() else {
                    return Err(DecodeError::new(
                        ErrorKind::ValueSize,
                        "single-ASN1-type must hold one value", 0,
                    ))
                };
                ExternalEncoding::SingleAsn1Type(inner.clone())
            }
            1 => {
                ExternalEncoding::OctetAligned(
                    encoding_elem.string_content(Tag::OCTET_STRING)?
                )
            }
            2 => ExternalEncoding::Arbitrary(encoding_elem.to_bit_string()?),
            _ => {
                return Err(DecodeError::new(
                    ErrorKind::TagNumber,
                    "unknown EXTERNAL encoding alternative", 0,
                ))
            }
        };

        Ok(External {
            direct_reference,
            indirect_reference,
            data_value_descriptor,
            encoding,
        })
    }

    /// Sets the element to an EXTERNAL value.
    ///
    /// Fails if the value carries no syntax reference at all or, in CER
    /// and DER mode, no direct reference.
    pub fn set_external(
        &mut self, value: &External,
    ) -> Result<(), DecodeError> {
        if value.direct_reference.is_none()
            && value.indirect_reference.is_none()
        {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid,
                "EXTERNAL without a syntax reference", 0,
            ))
        }
        if self.mode().is_restricted() && value.direct_reference.is_none() {
            return Err(DecodeError::new(
                ErrorKind::ValueInvalid,
                "EXTERNAL without a direct reference in CER/DER mode", 0,
            ))
        }

        let mut children = Vec::new();
        if let Some(oid) = &value.direct_reference {
            let mut elem = Element::new(self.mode(), Tag::OID);
            elem.set_oid(oid);
            children.push(elem);
        }
        if let Some(int) = &value.indirect_reference {
            let mut elem = Element::new(self.mode(), Tag::INTEGER);
            elem.set_integer(int);
            children.push(elem);
        }
        if let Some(descriptor) = &value.data_value_descriptor {
            let mut elem = Element::new(
                self.mode(), Tag::OBJECT_DESCRIPTOR
            );
            elem.set_string_content(Tag::OCTET_STRING, descriptor.as_ref());
            children.push(elem);
        }
        children.push(match &value.encoding {
            ExternalEncoding::SingleAsn1Type(inner) => {
                let mut elem = Element::new(self.mode(), Tag::ctx(0));
                elem.set_children(std::slice::from_ref(inner));
                elem
            }
            ExternalEncoding::OctetAligned(octets) => {
                let mut elem = Element::new(self.mode(), Tag::ctx(1));
                elem.set_string_content(
                    Tag::OCTET_STRING, octets.as_ref()
                );
                elem
            }
            ExternalEncoding::Arbitrary(bits) => {
                let mut elem = Element::new(self.mode(), Tag::ctx(2));
                elem.set_bit_string(bits);
                elem
            }
        });
        self.set_children(&children);
        Ok(())
    }

    /// Returns the value of an EMBEDDED PDV element.
    pub fn to_embedded_pdv(&self) -> Result<EmbeddedPdv, DecodeError> {
        let (identification, data_value) = self.pdv_parts()?;
        Ok(EmbeddedPdv { identification, data_value })
    }

    /// Sets the element to an EMBEDDED PDV value.
    pub fn set_embedded_pdv(&mut self, value: &EmbeddedPdv) {
        self.set_pdv_parts(&value.identification, value.data_value.as_ref())
    }

    /// Returns the value of a CHARACTER STRING element.
    pub fn to_character_string(
        &self
    ) -> Result<CharacterString, DecodeError> {
        let (identification, string_value) = self.pdv_parts()?;
        Ok(CharacterString { identification, string_value })
    }

    /// Sets the element to a CHARACTER STRING value.
    pub fn set_character_string(&mut self, value: &CharacterString) {
        self.set_pdv_parts(
            &value.identification, value.string_value.as_ref()
        )
    }

    /// Decodes the shared EMBEDDED PDV and CHARACTER STRING shape.
    fn pdv_parts(&self) -> Result<(Identification, Bytes), DecodeError> {
        let children = self.children()?;
        let [ident_elem, value_elem] = children.as_slice() else {
            return Err(DecodeError::new(
                ErrorKind::ValueSize,
                "expected identification and data value components", 0,
            ))
        };
        expect_tag(ident_elem, Tag::ctx(0))?;
        expect_tag(value_elem, Tag::ctx(2))?;

        // The identification CHOICE is explicitly tagged.
        let ident_children = ident_elem.children()?;
        let [ident_inner] = ident_children.as_slice() else {
            return Err(DecodeError::new(
                ErrorKind::ValueSize,
                "identification must hold a single alternative", 0,
            ))
        };
        let identification = Identification::from_element(ident_inner)?;
        let data_value = value_elem.string_content(Tag::OCTET_STRING)?;
        Ok((identification, data_value))
    }

    /// Encodes the shared EMBEDDED PDV and CHARACTER STRING shape.
    fn set_pdv_parts(
        &mut self, identification: &Identification, data_value: &[u8],
    ) {
        let mut ident_elem = Element::new(self.mode(), Tag::ctx(0));
        ident_elem.set_children(
            std::slice::from_ref(&identification.to_element(self.mode()))
        );
        let mut value_elem = Element::new(self.mode(), Tag::ctx(2));
        value_elem.set_string_content(Tag::OCTET_STRING, data_value);
        self.set_children(&[ident_elem, value_elem]);
    }
}

/// Checks that a component carries the expected tag.
fn expect_tag(elem: &Element, tag: Tag) -> Result<(), DecodeError> {
    if elem.class() != tag.class() {
        return Err(DecodeError::new(
            ErrorKind::TagClass, "unexpected component tag class", 0,
        ))
    }
    if elem.number() != tag.number() {
        return Err(DecodeError::new(
            ErrorKind::TagNumber, "unexpected component tag number", 0,
        ))
    }
    Ok(())
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn syntax_oid() -> Oid {
        Oid::from_components(&[1, 3, 6, 4, 1]).unwrap()
    }

    #[test]
    fn embedded_pdv_round_trip() {
        for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
            let value = EmbeddedPdv {
                identification: Identification::Syntax(syntax_oid()),
                data_value: Bytes::from_static(b"payload"),
            };
            let mut elem = Element::new_constructed(
                mode, Tag::EMBEDDED_PDV
            );
            elem.set_embedded_pdv(&value);
            let (decoded, _) = mode.decode_one(
                elem.to_bytes().as_ref()
            ).unwrap();
            assert_eq!(decoded.to_embedded_pdv().unwrap(), value);
        }
    }

    #[test]
    fn embedded_pdv_wire_shape() {
        let value = EmbeddedPdv {
            identification: Identification::Syntax(syntax_oid()),
            data_value: Bytes::from_static(b"xy"),
        };
        let mut elem = Element::new_constructed(
            Mode::Der, Tag::EMBEDDED_PDV
        );
        elem.set_embedded_pdv(&value);
        assert_eq!(
            elem.to_bytes().as_ref(),
            b"\x2B\x0C\
              \xA0\x06\x81\x04\x2B\x06\x04\x01\
              \x82\x02xy"
        );
    }

    #[test]
    fn identification_alternatives() {
        let alternatives = [
            Identification::Syntaxes {
                abstract_syntax: syntax_oid(),
                transfer_syntax: syntax_oid(),
            },
            Identification::Syntax(syntax_oid()),
            Identification::TransferSyntax(syntax_oid()),
            Identification::Fixed,
        ];
        for identification in alternatives {
            let value = EmbeddedPdv {
                identification,
                data_value: Bytes::from_static(b"d"),
            };
            let mut elem = Element::new_constructed(
                Mode::Der, Tag::EMBEDDED_PDV
            );
            elem.set_embedded_pdv(&value);
            let (decoded, _) = Mode::Der.decode_one(
                elem.to_bytes().as_ref()
            ).unwrap();
            assert_eq!(decoded.to_embedded_pdv().unwrap(), value);
        }
    }

    #[test]
    fn restricted_downgrades_identification() {
        for identification in [
            Identification::PresentationContextId(Integer::from_i128(9)),
            Identification::ContextNegotiation {
                presentation_context_id: Integer::from_i128(9),
                transfer_syntax: syntax_oid(),
            },
        ] {
            let value = EmbeddedPdv {
                identification: identification.clone(),
                data_value: Bytes::from_static(b"d"),
            };

            // DER quietly degrades to fixed.
            let mut elem = Element::new_constructed(
                Mode::Der, Tag::EMBEDDED_PDV
            );
            elem.set_embedded_pdv(&value);
            let (decoded, _) = Mode::Der.decode_one(
                elem.to_bytes().as_ref()
            ).unwrap();
            assert_eq!(
                decoded.to_embedded_pdv().unwrap().identification,
                Identification::Fixed
            );

            // BER keeps the alternative.
            let mut elem = Element::new_constructed(
                Mode::Ber, Tag::EMBEDDED_PDV
            );
            elem.set_embedded_pdv(&value);
            let (decoded, _) = Mode::Ber.decode_one(
                elem.to_bytes().as_ref()
            ).unwrap();
            assert_eq!(
                decoded.to_embedded_pdv().unwrap().identification,
                identification
            );
        }
    }

    #[test]
    fn unknown_identification_alternative() {
        // identification [0] wraps [6] which does not exist.
        let data = b"\x2B\x08\xA0\x02\x86\x00\x82\x02\x04\x00";
        let (elem, _) = Mode::Ber.decode_one(data).unwrap();
        assert_eq!(
            elem.to_embedded_pdv().unwrap_err().kind(),
            ErrorKind::TagNumber
        );
    }

    #[test]
    fn character_string_round_trip() {
        let value = CharacterString {
            identification: Identification::Fixed,
            string_value: Bytes::from_static(b"\x00H\x00i"),
        };
        let mut elem = Element::new_constructed(
            Mode::Der, Tag::CHARACTER_STRING
        );
        elem.set_character_string(&value);
        let (decoded, _) = Mode::Der.decode_one(
            elem.to_bytes().as_ref()
        ).unwrap();
        assert_eq!(decoded.to_character_string().unwrap(), value);
    }

    #[test]
    fn external_round_trip() {
        let value = External {
            direct_reference: Some(syntax_oid()),
            indirect_reference: Some(Integer::from_i128(3)),
            data_value_descriptor: Some(Bytes::from_static(b"desc")),
            encoding: ExternalEncoding::OctetAligned(
                Bytes::from_static(b"payload")
            ),
        };
        for mode in [Mode::Ber, Mode::Cer, Mode::Der] {
            let mut elem = Element::new_constructed(mode, Tag::EXTERNAL);
            elem.set_external(&value).unwrap();
            let (decoded, _) = mode.decode_one(
                elem.to_bytes().as_ref()
            ).unwrap();
            assert_eq!(decoded.to_external().unwrap(), value);
        }
    }

    #[test]
    fn external_single_asn1_type() {
        let mut inner = Element::new(Mode::Der, Tag::INTEGER);
        inner.set_i64(42);
        let value = External {
            direct_reference: Some(syntax_oid()),
            indirect_reference: None,
            data_value_descriptor: None,
            encoding: ExternalEncoding::SingleAsn1Type(inner),
        };
        let mut elem = Element::new_constructed(Mode::Der, Tag::EXTERNAL);
        elem.set_external(&value).unwrap();
        assert_eq!(
            elem.to_bytes().as_ref(),
            b"\x28\x0B\x06\x04\x2B\x06\x04\x01\xA0\x03\x02\x01\x2A"
        );
        let (decoded, _) = Mode::Der.decode_one(
            elem.to_bytes().as_ref()
        ).unwrap();
        let decoded = decoded.to_external().unwrap();
        match decoded.encoding {
            ExternalEncoding::SingleAsn1Type(inner) => {
                assert_eq!(inner.to_i64().unwrap(), 42);
            }
            _ => panic!("wrong encoding alternative"),
        }
    }

    #[test]
    fn external_arbitrary() {
        let bits = BitString::new(
            4, Bytes::from_static(b"\xA0")
        ).unwrap();
        let value = External {
            direct_reference: Some(syntax_oid()),
            indirect_reference: None,
            data_value_descriptor: None,
            encoding: ExternalEncoding::Arbitrary(bits),
        };
        let mut elem = Element::new_constructed(Mode::Der, Tag::EXTERNAL);
        elem.set_external(&value).unwrap();
        let (decoded, _) = Mode::Der.decode_one(
            elem.to_bytes().as_ref()
        ).unwrap();
        assert_eq!(decoded.to_external().unwrap(), value);
    }

    #[test]
    fn external_requires_reference() {
        let value = External {
            direct_reference: None,
            indirect_reference: None,
            data_value_descriptor: None,
            encoding: ExternalEncoding::OctetAligned(Bytes::new()),
        };
        let mut elem = Element::new_constructed(Mode::Ber, Tag::EXTERNAL);
        assert_eq!(
            elem.set_external(&value).unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );

        // An indirect reference only is fine in BER but not in DER.
        let value = External {
            indirect_reference: Some(Integer::from_i128(3)),
            ..value
        };
        let mut ber_elem = Element::new_constructed(
            Mode::Ber, Tag::EXTERNAL
        );
        ber_elem.set_external(&value).unwrap();
        let (decoded, _) = Mode::Ber.decode_one(
            ber_elem.to_bytes().as_ref()
        ).unwrap();
        assert_eq!(decoded.to_external().unwrap(), value);

        let mut der_elem = Element::new_constructed(
            Mode::Der, Tag::EXTERNAL
        );
        assert_eq!(
            der_elem.set_external(&value).unwrap_err().kind(),
            ErrorKind::ValueInvalid
        );
    }
}
