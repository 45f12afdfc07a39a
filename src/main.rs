// lamarun: a bytecode interpreter for the Lama language.
//
// Copyright (C) 2019  Brandon Lewis
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU Lesser General Public License
// as published by the Free Software Foundation, either version 3 of
// the License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public
// License along with this program.  If not, see
// <https://www.gnu.org/licenses/>.

use std::env::args;
use std::process::exit;

use lamarun::bytefile;
use lamarun::config::{self, Config};
use lamarun::runtime::Console;
use lamarun::vm::{Error, Vm};

fn main() {
    let path = match args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: lamarun <bytecode-file> [config.ron]");
            exit(2);
        }
    };

    let config = match args().nth(2) {
        Some(path) => match config::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {}", e);
                exit(1);
            }
        },
        None => Config::default(),
    };

    let file = match bytefile::read_file(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("error: {}", e);
            exit(1);
        }
    };

    let mut vm = match Vm::new(&file, config.stack, config.trace) {
        Ok(vm) => vm,
        Err(e) => {
            eprintln!("error: {}", e);
            exit(1);
        }
    };

    match vm.run(&mut Console) {
        Ok(()) => {}
        // A program-signalled FAIL reports its source position and
        // nothing else.
        Err(Error::Failure(line, col)) => {
            eprintln!("{}:{}", line, col);
            exit(1);
        }
        Err(e) => {
            eprintln!("0x{:08x}: {}", vm.pc(), e);
            exit(1);
        }
    }
}
