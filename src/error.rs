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
use std::fmt;
use std::io;

// ===================================================================
// LexError
// ===================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub row: usize,
    pub column: usize,
    pub message: String,
}

impl LexError {
    pub fn new(row: usize, column: usize, message: impl Into<String>) -> Self {
        Self { row, column, message: message.into() }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LexError: {} (line {}, column {})", self.message, self.row, self.column)
    }
}

impl std::error::Error for LexError {}

// ===================================================================
// ParseError
// ===================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub row: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(row: usize, column: usize, message: impl Into<String>) -> Self {
        Self { row, column, message: message.into() }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ParseError: {} (line {}, column {})", self.message, self.row, self.column)
    }
}

impl std::error::Error for ParseError {}

// ===================================================================
// RuntimeError / Fault
// ===================================================================

/// A fault raised while the vm is dispatching instructions. Each variant
/// corresponds to exactly one of the runtime checks in the vm's dispatch
/// loop; none of them are recoverable.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    UndefinedVariable(String),
    DivisionByZeroInt,
    DivisionByZeroFloat,
    StackUnderflow,
    InvalidReadInput(String),
    UnresolvedLabel,
    MissingLabelReference,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RuntimeError::UndefinedVariable(name) => write!(f, "undefined variable '{}'", name),
            RuntimeError::DivisionByZeroInt => write!(f, "division by zero (integer)"),
            RuntimeError::DivisionByZeroFloat => write!(f, "division by zero (float)"),
            RuntimeError::StackUnderflow => write!(f, "operand stack underflow"),
            RuntimeError::InvalidReadInput(tok) => write!(f, "could not parse '{}' as a number", tok),
            RuntimeError::UnresolvedLabel => write!(f, "jump to an undefined label"),
            RuntimeError::MissingLabelReference => {
                write!(f, "internal error: label reference not immediately followed by a jump")
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// A [`RuntimeError`] tagged with the index of the instruction that raised
/// it, as required for the diagnostic the vm prints on a fault.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub index: usize,
    pub error: RuntimeError,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "RuntimeError: {} (instruction {})", self.error, self.index)
    }
}

impl std::error::Error for Fault {}

// ===================================================================
// TinyilError
// ===================================================================

/// The union of every error this crate can produce, so the CLI has a
/// single type to match on between loading, compiling and executing.
#[derive(Debug)]
pub enum TinyilError {
    Io(io::Error),
    Lex(LexError),
    Parse(ParseError),
    Fault(Fault),
}

impl fmt::Display for TinyilError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TinyilError::Io(e) => write!(f, "IoError: {}", e),
            TinyilError::Lex(e) => write!(f, "{}", e),
            TinyilError::Parse(e) => write!(f, "{}", e),
            TinyilError::Fault(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TinyilError {}

impl From<io::Error> for TinyilError {
    fn from(e: io::Error) -> Self {
        TinyilError::Io(e)
    }
}

impl From<LexError> for TinyilError {
    fn from(e: LexError) -> Self {
        TinyilError::Lex(e)
    }
}

impl From<ParseError> for TinyilError {
    fn from(e: ParseError) -> Self {
        TinyilError::Parse(e)
    }
}

impl From<Fault> for TinyilError {
    fn from(e: Fault) -> Self {
        TinyilError::Fault(e)
    }
}
