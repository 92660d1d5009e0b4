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

//! Renders the textual output artifacts. Everything here produces strings;
//! the driver decides where they land on disk.

use super::CompileContext;
use super::symbol_table::{SymbolKind, SymbolTable};

/// Glyph alphabet of the object file's base-64 rendering.
const GLYPHS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A 12-bit word as two glyphs: high six bits first, low six bits second.
pub fn to_glyphs(word: u16) -> String {
    let high = GLYPHS[((word >> 6) & 0x3F) as usize] as char;
    let low = GLYPHS[(word & 0x3F) as usize] as char;
    let mut glyphs = String::with_capacity(2);
    glyphs.push(high);
    glyphs.push(low);
    glyphs
}

/// The object image: the final counters on the first line, then every code
/// word and every data word, one per line.
pub fn object_file(ctx: &CompileContext) -> String {
    let mut out = format!("{} {}\n", ctx.final_ic, ctx.final_dc);
    for word in ctx.code_segment.iter().chain(ctx.data_segment.iter()) {
        out.push_str(&to_glyphs(*word));
        out.push('\n');
    }
    out
}

/// One line per entry symbol, in declaration order. No entries, no file.
pub fn entries_file(symbols: &SymbolTable) -> Option<String> {
    let mut out = String::new();
    for symbol in symbols.iter().filter(|s| s.kind == SymbolKind::Entry) {
        out.push_str(&format!("{} {}\n", symbol.name, symbol.address));
    }
    (!out.is_empty()).then_some(out)
}

/// One line per use of an external label, in encoding order. No uses, no
/// file.
pub fn externals_file(ctx: &CompileContext) -> Option<String> {
    let mut out = String::new();
    for reference in &ctx.externals {
        out.push_str(&format!("{} {}\n", reference.name, reference.address));
    }
    (!out.is_empty()).then_some(out)
}
