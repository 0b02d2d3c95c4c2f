use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Allocate(#[from] AllocateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("line {1}: invalid token `{0}`")]
    InvalidToken(String, usize),

    #[error("line {1}: unexpected `{0}`")]
    UnexpectedToken(String, usize),

    #[error("line {0}: unexpected end of line")]
    UnexpectedEol(usize),

    #[error("line {1}: `{0}` is not a register")]
    UnknownRegister(String, usize),

    #[error("line {1}: `{0}` is not an ALU operation")]
    InvalidOperation(String, usize),

    #[error("line {1}: address {0} is outside the control store")]
    AddressOutOfRange(String, usize),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TranslateError {
    #[error("label `{0}` is declared twice")]
    DuplicateLabel(String),

    #[error("invalid if statement: `{0}`/`{1}` conflicts with an earlier target pair")]
    InvalidIfElsePairing(String, String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AllocateError {
    #[error("infeasible layout: region 0x{0:03X}..0x{1:03X} overlaps an allocated region")]
    RegionConflict(usize, usize),

    #[error("infeasible layout: no free chunk of {size} words for block `{label}`")]
    NoRoom { label: String, size: usize },

    #[error(
        "infeasible layout: no chunk pair holds else `{else_label}` ({else_size} words) \
         and if `{if_label}` ({if_size} words) at displacement {displacement}"
    )]
    NoPairRoom {
        if_label: String,
        else_label: String,
        if_size: usize,
        else_size: usize,
        displacement: u16,
    },

    #[error("infeasible layout: if/else target `{0}` is paired with `{1}`, which has no block or address")]
    UnplacedPairTarget(String, String),

    #[error(
        "infeasible layout: pinned if/else targets `{if_label}` (0x{if_address:03X}) and \
         `{else_label}` (0x{else_address:03X}) are not {displacement} words apart"
    )]
    PinnedPairMismatch {
        if_label: String,
        else_label: String,
        if_address: u16,
        else_address: u16,
        displacement: u16,
    },
}
