use strum::EnumIter;

/// Control bits of a micro-word, named after the datapath signals they
/// drive. The discriminant is the bit position, LSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum CBit {
    B0 = 0,
    B1 = 1,
    B2 = 2,
    B3 = 3,
    Fetch = 4,
    Read = 5,
    Write = 6,
    CMar = 7,
    CMdr = 8,
    CPc = 9,
    CSp = 10,
    CLv = 11,
    CCpp = 12,
    CTos = 13,
    COpc = 14,
    CH = 15,
    Inc = 16,
    InvA = 17,
    EnB = 18,
    EnA = 19,
    F1 = 20,
    F0 = 21,
    Sra1 = 22,
    Sll8 = 23,
    Jamz = 24,
    Jamn = 25,
    Jmpc = 26,
}

impl CBit {
    pub const fn mask(self) -> u32 {
        1 << self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            CBit::B0 => "B_0",
            CBit::B1 => "B_1",
            CBit::B2 => "B_2",
            CBit::B3 => "B_3",
            CBit::Fetch => "FETCH",
            CBit::Read => "READ",
            CBit::Write => "WRITE",
            CBit::CMar => "C_MAR",
            CBit::CMdr => "C_MDR",
            CBit::CPc => "C_PC",
            CBit::CSp => "C_SP",
            CBit::CLv => "C_LV",
            CBit::CCpp => "C_CPP",
            CBit::CTos => "C_TOS",
            CBit::COpc => "C_OPC",
            CBit::CH => "C_H",
            CBit::Inc => "INC",
            CBit::InvA => "INV_A",
            CBit::EnB => "EN_B",
            CBit::EnA => "EN_A",
            CBit::F1 => "F_1",
            CBit::F0 => "F_0",
            CBit::Sra1 => "SRA_1",
            CBit::Sll8 => "SLL_8",
            CBit::Jamz => "JAMZ",
            CBit::Jamn => "JAMN",
            CBit::Jmpc => "JMPC",
        }
    }
}

/// Mask covering the four B selector bits.
pub const B_FIELD: u32 = CBit::B0.mask() | CBit::B1.mask() | CBit::B2.mask() | CBit::B3.mask();

/// Reset state of the control field. Selector 0b1001 is unused by the
/// datapath, so no register drives the B bus.
pub const NO_B_SOURCE: u32 = CBit::B0.mask() | CBit::B3.mask();
