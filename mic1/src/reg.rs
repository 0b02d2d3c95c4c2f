use bimap::BiMap;
use once_cell::sync::Lazy;
use std::fmt::Display;

use crate::cbit::CBit;

// ----------------------------------------------------------------------------
// B bus

/// Registers readable on the B bus.
///
/// `MDR` and `MAR` both select the memory data path at 0b0000; sources
/// written against either name assemble identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BReg {
    MAR,
    MDR,
    PC,
    MBR,
    MBRU,
    SP,
    LV,
    CPP,
    TOS,
    OPC,
}

static B_REG: Lazy<BiMap<&'static str, BReg>> = Lazy::new(|| {
    let mut map: BiMap<&'static str, BReg> = BiMap::new();
    map.insert("MAR", BReg::MAR);
    map.insert("MDR", BReg::MDR);
    map.insert("PC", BReg::PC);
    map.insert("MBR", BReg::MBR);
    map.insert("MBRU", BReg::MBRU);
    map.insert("SP", BReg::SP);
    map.insert("LV", BReg::LV);
    map.insert("CPP", BReg::CPP);
    map.insert("TOS", BReg::TOS);
    map.insert("OPC", BReg::OPC);
    map
});

impl BReg {
    pub fn parse(s: &str) -> Option<BReg> {
        B_REG.get_by_left(s).copied()
    }

    pub fn format(&self) -> &'static str {
        B_REG.get_by_right(self).unwrap()
    }

    /// Value written into the four B selector bits.
    pub fn selector(&self) -> u32 {
        match self {
            BReg::MAR | BReg::MDR => 0b0000,
            BReg::PC => 0b0001,
            BReg::MBR => 0b0010,
            BReg::MBRU => 0b0011,
            BReg::SP => 0b0100,
            BReg::LV => 0b0101,
            BReg::CPP => 0b0110,
            BReg::TOS => 0b0111,
            BReg::OPC => 0b1000,
        }
    }
}

impl Display for BReg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}

// ----------------------------------------------------------------------------
// C bus

/// Registers writable from the C bus, each behind its own write enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CReg {
    MAR,
    MDR,
    PC,
    SP,
    LV,
    CPP,
    TOS,
    OPC,
    H,
}

static C_REG: Lazy<BiMap<&'static str, CReg>> = Lazy::new(|| {
    let mut map: BiMap<&'static str, CReg> = BiMap::new();
    map.insert("MAR", CReg::MAR);
    map.insert("MDR", CReg::MDR);
    map.insert("PC", CReg::PC);
    map.insert("SP", CReg::SP);
    map.insert("LV", CReg::LV);
    map.insert("CPP", CReg::CPP);
    map.insert("TOS", CReg::TOS);
    map.insert("OPC", CReg::OPC);
    map.insert("H", CReg::H);
    map
});

impl CReg {
    pub fn parse(s: &str) -> Option<CReg> {
        C_REG.get_by_left(s).copied()
    }

    pub fn format(&self) -> &'static str {
        C_REG.get_by_right(self).unwrap()
    }

    pub fn enable(&self) -> CBit {
        match self {
            CReg::MAR => CBit::CMar,
            CReg::MDR => CBit::CMdr,
            CReg::PC => CBit::CPc,
            CReg::SP => CBit::CSp,
            CReg::LV => CBit::CLv,
            CReg::CPP => CBit::CCpp,
            CReg::TOS => CBit::CTos,
            CReg::OPC => CBit::COpc,
            CReg::H => CBit::CH,
        }
    }
}

impl Display for CReg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn b_names_round_trip() {
        for name in ["MAR", "MDR", "PC", "MBR", "MBRU", "SP", "LV", "CPP", "TOS", "OPC"] {
            let reg = BReg::parse(name).unwrap();
            assert_eq!(reg.format(), name);
        }
        assert_eq!(BReg::parse("H"), None);
        assert_eq!(BReg::parse("mdr"), None);
    }

    #[test]
    fn b_selectors() {
        assert_eq!(BReg::MDR.selector(), 0b0000);
        assert_eq!(BReg::MAR.selector(), 0b0000);
        assert_eq!(BReg::MBR.selector(), 0b0010);
        assert_eq!(BReg::MBRU.selector(), 0b0011);
        assert_eq!(BReg::OPC.selector(), 0b1000);
    }

    #[test]
    fn c_enables() {
        assert_eq!(CReg::parse("H").unwrap().enable(), CBit::CH);
        assert_eq!(CReg::parse("MAR").unwrap().enable(), CBit::CMar);
        assert_eq!(CReg::parse("MBR"), None);
    }
}
