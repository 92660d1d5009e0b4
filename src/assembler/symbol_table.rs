/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use super::LOAD_ADDRESS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Points into the code segment.
    Code,
    /// Points into the data segment.
    Data,
    /// Defined in another translation unit; the address stays zero.
    Extern,
    /// A local label exported for other translation units.
    Entry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub address: u16,
    pub kind: SymbolKind,
    /// 1-based source row of the declaration.
    pub row: usize,
}

/// The symbol table keeps declaration order, so the entries artifact lists
/// labels in the order the program declared them.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.iter_mut().find(|s| s.name == name)
    }

    pub fn insert(&mut self, symbol: Symbol) {
        self.symbols.push(symbol);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Moves every locally defined label up by the load address, and data
    /// labels additionally past the end of the code segment.
    pub fn relocate(&mut self, final_ic: u16) {
        for symbol in &mut self.symbols {
            if symbol.kind != SymbolKind::Extern {
                symbol.address += LOAD_ADDRESS;
            }
            if symbol.kind == SymbolKind::Data {
                symbol.address += final_ic;
            }
        }
    }
}
