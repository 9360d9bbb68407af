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
use std::fs;
use std::io::{self, Write};

use clap::{arg, Command};
use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use tinyil::error::TinyilError;
use tinyil::parser::compile;
use tinyil::vm::Vm;

fn main() {
    let matches = Command::new("tinyil")
        .about("Compiles and executes a tiny imperative language")
        .version("0.1.0")
        .arg(arg!(--verbose "Show verbose output"))
        .arg(arg!([file] "Path to a source file"))
        .get_matches();

    let verbose = matches.is_present("verbose");
    init_logging(if verbose { LevelFilter::Debug } else { LevelFilter::Info });

    let exitcode = match matches.value_of("file") {
        Some(path) => match run(path) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{}", e);
                1
            }
        },
        None => {
            eprintln!("tinyil: missing source file argument");
            1
        }
    };
    std::process::exit(exitcode);
}

/// Load, compile and execute one source file, wiring real stdin/stdout to
/// the vm's `Read`/`Print` handlers.
fn run(path: &str) -> Result<(), TinyilError> {
    log::debug!("loading {}", path);
    let source = fs::read_to_string(path)?;

    log::debug!("compiling {} bytes of source", source.len());
    let code = compile(&source)?;
    log::info!("compiled {} instructions", code.len());

    let mut vm = Vm::new(&code);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    vm.run(&mut input, &mut output)?;
    output.flush().ok();
    log::debug!("execution finished");
    Ok(())
}

/// Initialise logging with a plain console pattern; `--verbose` raises
/// the level to `Debug`.
pub fn init_logging(level: LevelFilter) {
    let encoder = PatternEncoder::new("[{l}] {m}{n}");
    let stdout = ConsoleAppender::builder().encoder(Box::new(encoder)).build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level))
        .unwrap();
    let _handle = log4rs::init_config(config).unwrap();
}
