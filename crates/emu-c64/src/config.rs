//! C64 configuration: timing variant and ROM images.

use crate::vic::VicVariant;

/// Configuration for constructing a C64 instance.
pub struct C64Config {
    /// Which VIC-II chip drives raster timing.
    pub vic_variant: VicVariant,
    /// Kernal ROM (8,192 bytes).
    pub kernal_rom: Vec<u8>,
    /// BASIC ROM (8,192 bytes).
    pub basic_rom: Vec<u8>,
    /// Character ROM (4,096 bytes).
    pub char_rom: Vec<u8>,
}

impl C64Config {
    /// A PAL configuration with the given ROM images.
    #[must_use]
    pub fn pal(kernal_rom: Vec<u8>, basic_rom: Vec<u8>, char_rom: Vec<u8>) -> Self {
        Self {
            vic_variant: VicVariant::Pal6569,
            kernal_rom,
            basic_rom,
            char_rom,
        }
    }

    /// An NTSC configuration (6567R8 timing) with the given ROM images.
    #[must_use]
    pub fn ntsc(kernal_rom: Vec<u8>, basic_rom: Vec<u8>, char_rom: Vec<u8>) -> Self {
        Self {
            vic_variant: VicVariant::Ntsc6567R8,
            kernal_rom,
            basic_rom,
            char_rom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pal_constructor_selects_pal_variant() {
        let config = C64Config::pal(vec![0; 8192], vec![0; 8192], vec![0; 4096]);
        assert_eq!(config.vic_variant, VicVariant::Pal6569);
    }

    #[test]
    fn ntsc_constructor_selects_ntsc_variant() {
        let config = C64Config::ntsc(vec![0; 8192], vec![0; 8192], vec![0; 4096]);
        assert_eq!(config.vic_variant, VicVariant::Ntsc6567R8);
    }
}
