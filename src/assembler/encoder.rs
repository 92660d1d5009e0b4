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

//! Word composition for the 12-bit instruction encoding. Words are built
//! with explicit shifts and masks over `u16`; only the low 12 bits carry
//! meaning.

use crate::classifier::Operand;
use crate::operations::{Addressing, AddressingKind, Operation};

use super::symbol_table::{SymbolKind, SymbolTable};

pub const WORD_MASK: u16 = 0x0FFF;

pub const ARE_ABSOLUTE: u16 = 0;
pub const ARE_EXTERNAL: u16 = 1;
pub const ARE_RELOCATABLE: u16 = 2;

/// Bit offset of a source register number within an operand word's payload.
const SOURCE_REGISTER_SHIFT: u16 = 5;

/// The words of one encoded instruction, plus bookkeeping the second pass
/// needs: which external labels the operand words referenced (with the
/// word's offset inside the instruction, 1 or 2) and how many label operands
/// failed to resolve.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Encoding {
    pub words: Vec<u16>,
    pub extern_uses: Vec<(String, u16)>,
    pub undefined_labels: usize,
}

enum Position {
    Source,
    Destination,
}

/// Encodes one instruction into its 1-3 memory words. A lone operand sits in
/// the destination position; two register operands share their word.
pub fn encode_instruction(
    operation: &Operation,
    operands: &[Operand],
    symbols: &SymbolTable,
) -> Encoding {
    let mut encoding = Encoding::default();

    match operands {
        [] => {
            encoding.words.push(first_word(operation.opcode, 0, 0));
        }
        [destination] => {
            encoding.words.push(first_word(
                operation.opcode,
                0,
                addressing_code(&destination.addressing),
            ));
            let word = operand_word(&mut encoding, destination, symbols, Position::Destination);
            encoding.words.push(word);
        }
        [source, destination, ..] => {
            encoding.words.push(first_word(
                operation.opcode,
                addressing_code(&source.addressing),
                addressing_code(&destination.addressing),
            ));
            match (&source.addressing, &destination.addressing) {
                (Addressing::Register(s), Addressing::Register(d)) => {
                    encoding.words.push(register_pair_word(*s, *d));
                }
                _ => {
                    let word = operand_word(&mut encoding, source, symbols, Position::Source);
                    encoding.words.push(word);
                    let word =
                        operand_word(&mut encoding, destination, symbols, Position::Destination);
                    encoding.words.push(word);
                }
            }
        }
    }
    encoding
}

/// The shared first word: ARE in bits 0-1 (always absolute), destination
/// addressing in bits 2-4, opcode in bits 5-8, source addressing in bits
/// 9-11.
pub fn first_word(opcode: u16, source_code: u16, destination_code: u16) -> u16 {
    ((source_code << 9) | (opcode << 5) | (destination_code << 2)) & WORD_MASK
}

/// Two register operands share one word: source number in bits 7-11,
/// destination number in bits 2-6, ARE absolute.
pub fn register_pair_word(source: u8, destination: u8) -> u16 {
    (((source as u16) << 7) | ((destination as u16) << 2)) & WORD_MASK
}

/// An operand's extra word. Immediates are sign-narrowed into the payload;
/// labels carry their resolved address and an ARE of external or
/// relocatable; an unresolved label is recorded and encoded as an absolute
/// zero.
fn operand_word(
    encoding: &mut Encoding,
    operand: &Operand,
    symbols: &SymbolTable,
    position: Position,
) -> u16 {
    let offset = encoding.words.len() as u16;
    match &operand.addressing {
        Addressing::Immediate(value) => compose(*value as u16, ARE_ABSOLUTE),
        Addressing::Register(number) => {
            let payload = match position {
                Position::Source => (*number as u16) << SOURCE_REGISTER_SHIFT,
                Position::Destination => *number as u16,
            };
            compose(payload, ARE_ABSOLUTE)
        }
        Addressing::Label(name) => match symbols.get(name) {
            Some(symbol) if symbol.kind == SymbolKind::Extern => {
                encoding.extern_uses.push((name.clone(), offset));
                compose(symbol.address, ARE_EXTERNAL)
            }
            Some(symbol) => compose(symbol.address, ARE_RELOCATABLE),
            None => {
                encoding.undefined_labels += 1;
                compose(0, ARE_ABSOLUTE)
            }
        },
        Addressing::Unknown => compose(0, ARE_ABSOLUTE),
    }
}

/// Packs a payload into bits 2-11, above the two ARE bits.
fn compose(payload: u16, are: u16) -> u16 {
    ((payload << 2) | are) & WORD_MASK
}

fn addressing_code(addressing: &Addressing) -> u16 {
    match addressing.kind() {
        Some(AddressingKind::Immediate) => 1,
        Some(AddressingKind::Label) => 3,
        Some(AddressingKind::Register) => 5,
        None => 0,
    }
}
