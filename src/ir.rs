// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Identifies a jump target. Minted once per use by the parser's label
/// counter and never reused — see `Parser::fresh_label`.
pub type Label = u32;

/// One entry in the linear postfix instruction stream the parser emits
/// while it recognizes the grammar. There is no separate AST: every
/// opcode below is pushed directly as the corresponding production is
/// recognized.
#[derive(Debug, Clone, PartialEq)]
pub enum Opcode {
    PushInt(i64),
    PushFloat(f64),
    PushName(String),

    Add,
    Sub,
    Mul,
    Div,

    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,

    Assign,

    Read,
    Print,

    /// Always preceded by exactly one `LabelRef`, which names the target.
    Jmp,
    /// Same pairing as `Jmp`; branches only when the popped condition is
    /// false (integer 0 or float 0.0).
    JumpIfFalse,

    /// Marks the instruction index a matching `LabelRef` may target. A
    /// no-op at execution time.
    LabelDef(Label),
    /// Always immediately followed by `Jmp` or `JumpIfFalse`; carries the
    /// label that instruction branches to.
    LabelRef(Label),
}

/// A vm-internal value. `Name` only ever appears transiently on the
/// operand stack, as an unresolved assignment/read target or an operand
/// awaiting symbol-table resolution; it is never a value a symbol table
/// entry itself holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Name(String),
}
