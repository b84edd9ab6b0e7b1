//! CPU variant selection.

/// Which physical 6502 family member is being emulated.
///
/// 6502, 6502A and 6502C differ only in maximum clock speed, which is
/// non-behavioral for software purposes; the table treats them identically
/// at the instruction level. CMOS 65C02 diverges in several documented
/// places (see `Mos6502` docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Nmos6502,
    Nmos6502A,
    Nmos6502C,
    Cmos65C02,
}

impl Variant {
    /// True for the 65C02; false for all NMOS variants.
    #[must_use]
    pub const fn is_cmos(self) -> bool {
        matches!(self, Variant::Cmos65C02)
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::Nmos6502
    }
}
