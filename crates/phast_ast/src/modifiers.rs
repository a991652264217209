//! Declaration modifiers on classes, methods and properties.

use crate::syntax_kind::SyntaxKind;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const NONE      = 0;
        const ABSTRACT  = 1 << 0;
        const FINAL     = 1 << 1;
        const PUBLIC    = 1 << 2;
        const PROTECTED = 1 << 3;
        const PRIVATE   = 1 << 4;
        const STATIC    = 1 << 5;
        const READONLY  = 1 << 6;

        const VISIBILITY = Self::PUBLIC.bits() | Self::PROTECTED.bits() | Self::PRIVATE.bits();

        const ALLOWED_ON_CLASS = Self::ABSTRACT.bits() | Self::FINAL.bits();
        const ALLOWED_ON_METHOD = Self::ABSTRACT.bits()
            | Self::FINAL.bits()
            | Self::VISIBILITY.bits()
            | Self::STATIC.bits();
        const ALLOWED_ON_PROPERTY = Self::STATIC.bits()
            | Self::READONLY.bits()
            | Self::VISIBILITY.bits();
    }
}

/// Groups of modifiers where at most one member may appear on a declaration.
pub const COLLIDING_MODIFIERS: &[Modifiers] = &[
    Modifiers::VISIBILITY,
    Modifiers::FINAL.union(Modifiers::ABSTRACT),
];

impl Modifiers {
    pub fn from_token_kind(kind: SyntaxKind) -> Modifiers {
        match kind {
            SyntaxKind::AbstractKeyword => Modifiers::ABSTRACT,
            SyntaxKind::FinalKeyword => Modifiers::FINAL,
            SyntaxKind::PublicKeyword => Modifiers::PUBLIC,
            SyntaxKind::ProtectedKeyword => Modifiers::PROTECTED,
            SyntaxKind::PrivateKeyword => Modifiers::PRIVATE,
            SyntaxKind::StaticKeyword => Modifiers::STATIC,
            SyntaxKind::ReadonlyKeyword => Modifiers::READONLY,
            _ => Modifiers::NONE,
        }
    }
}
