use indexmap::{IndexMap, IndexSet};

use crate::error::TranslateError;
use mic1::cbit::NO_B_SOURCE;
use mic1::word;

/// One translated microinstruction. Address and next address stay `None`
/// until the translator or allocator determines them.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub address: Option<u16>,
    pub next_address: Option<u16>,
    pub control: u32,
    pub is_halt: bool,
    pub label: Option<String>,
    pub target_label: Option<String>,
}

impl Default for Instruction {
    fn default() -> Self {
        Instruction {
            address: None,
            next_address: None,
            control: NO_B_SOURCE,
            is_halt: false,
            label: None,
            target_label: None,
        }
    }
}

impl Instruction {
    /// The packed 36-bit word, once fully determined.
    pub fn word(&self) -> Option<u64> {
        match (self.address, self.next_address) {
            (Some(_), Some(next)) => Some(word::pack(next, self.control)),
            _ => None,
        }
    }
}

/// Everything known about a program after the translation walk; the
/// allocator fills in the remaining addresses in place.
#[derive(Debug, Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    /// Label name to control store address, `None` until placed.
    pub address_for_label: IndexMap<String, Option<u16>>,
    /// Label name to the index of its host instruction.
    pub count_for_label: IndexMap<String, usize>,
    /// Regions committed to pinned blocks during translation.
    pub reclaim_promises: Vec<(u16, u16)>,
    /// Block start instruction index to block size, in source order.
    pub block_annotations: IndexMap<usize, usize>,
    if_else_targets: IndexMap<String, String>,
    else_targets: IndexSet<String>,
}

impl Program {
    /// Registers an if/else target pair.
    ///
    /// The pair map is bidirectional: once `if (c) goto a; else goto b`
    /// is seen, `a` can never be an else target, `b` can never be an if
    /// target, and neither can pair with a third label. Registering the
    /// same pair again is a no-op.
    pub fn add_if_else_target(
        &mut self,
        if_label: &str,
        else_label: &str,
    ) -> Result<(), TranslateError> {
        let both_new = !self.if_else_targets.contains_key(if_label)
            && !self.if_else_targets.contains_key(else_label);
        if both_new {
            self.if_else_targets
                .insert(if_label.to_string(), else_label.to_string());
            self.if_else_targets
                .insert(else_label.to_string(), if_label.to_string());
            self.else_targets.insert(else_label.to_string());
            Ok(())
        } else if self.if_else_targets.get(if_label).map(String::as_str) == Some(else_label) {
            Ok(())
        } else {
            Err(TranslateError::InvalidIfElsePairing(
                if_label.to_string(),
                else_label.to_string(),
            ))
        }
    }

    pub fn has_if_else_target(&self, label: &str) -> bool {
        self.if_else_targets.contains_key(label)
    }

    /// The other member of a registered pair.
    pub fn paired_target(&self, label: &str) -> Option<&str> {
        self.if_else_targets.get(label).map(String::as_str)
    }

    pub fn is_else_target(&self, label: &str) -> bool {
        self.else_targets.contains(label)
    }

    pub fn is_if_target(&self, label: &str) -> bool {
        self.has_if_else_target(label) && !self.else_targets.contains(label)
    }

    /// All registered pairs as (if label, else label).
    pub fn if_else_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.if_else_targets
            .iter()
            .filter(|(name, _)| !self.else_targets.contains(name.as_str()))
            .map(|(if_label, else_label)| (if_label.as_str(), else_label.as_str()))
    }

    pub fn address_of(&self, label: &str) -> Option<u16> {
        self.address_for_label.get(label).copied().flatten()
    }
}
