use indexmap::IndexMap;
use serde::Serialize;

use crate::program::Program;

/// Label map of an assembled program, written next to the store image for
/// debugging the microcode from HDL simulation.
#[derive(Debug, Serialize)]
pub struct SymbolMap {
    pub labels: IndexMap<String, SymbolEntry>,
}

#[derive(Debug, Serialize)]
pub struct SymbolEntry {
    pub address: u16,
    pub instruction: usize,
}

impl SymbolMap {
    /// Collects every placed label; labels of dropped blocks are omitted.
    pub fn generate(program: &Program) -> Self {
        let mut labels = IndexMap::new();
        for (name, address) in &program.address_for_label {
            if let Some(address) = address {
                let instruction = program.count_for_label.get(name).copied().unwrap_or(0);
                labels.insert(
                    name.clone(),
                    SymbolEntry {
                        address: *address,
                        instruction,
                    },
                );
            }
        }
        SymbolMap { labels }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
