//! Interactive command loop.

use crate::printer;
use alder_common::{Result, StoreConfig, MAX_ORDER, MIN_ORDER};
use alder_index::{BTreeIndex, Record, RecordKind};
use alder_store::StoreFile;
use std::io::{self, BufRead, Write};

/// Schema id the shell saves its tree under.
const SCHEMA_ID: u16 = 1;

pub struct Shell {
    tree: BTreeIndex,
    store: StoreConfig,
    verbose: bool,
}

impl Shell {
    pub fn new(tree: BTreeIndex, store: StoreConfig) -> Self {
        Self {
            tree,
            store,
            verbose: false,
        }
    }

    /// Prompt loop; returns on `q` or end of input.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            print!(">> ");
            io::stdout().flush()?;
            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                println!();
                return Ok(());
            }
            if !self.dispatch(line.trim()) {
                return Ok(());
            }
        }
    }

    pub fn print_status(&self) {
        println!("Current config:");
        println!("  Min order {}", MIN_ORDER);
        println!("  Max order {}", MAX_ORDER);
        println!("  Current order {}", self.tree.order());
        println!("  Record type {}", RecordKind::Int);
        println!(
            "  Verbose output {}",
            if self.verbose { "on" } else { "off" }
        );
        println!();
    }

    pub fn print_help(&self) {
        println!(
            "Enter any of the following commands after the prompt >>:\n\
             \x20 i <k>\t\tInsert <k> as both key and value\n\
             \x20 f <k>\t\tFind the value under key <k>\n\
             \x20 p <k>\t\tPrint the path from the root to key <k> and its value\n\
             \x20 r <k1> <k2>\tPrint the keys and values found in the range [<k1>, <k2>]\n\
             \x20 d <k>\t\tDelete key <k> and its associated value\n\
             \x20 x\t\tDestroy the whole tree; start again with the same order\n\
             \x20 t\t\tPrint the tree\n\
             \x20 l\t\tPrint the keys of the leaves (bottom row of the tree)\n\
             \x20 v\t\tToggle node-id output (\"verbose\") in tree and leaves\n\
             \x20 s\t\tSave header and schema to the store file\n\
             \x20 o\t\tRestore the order from the store file into an empty tree\n\
             \x20 a\t\tPrint status\n\
             \x20 q\t\tQuit (or use Ctrl-D)\n\
             \x20 ?\t\tPrint this help message"
        );
    }

    /// Runs one command; returns `false` to quit.
    fn dispatch(&mut self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return true;
        };
        let arg1 = parts.next().and_then(|t| t.parse::<i32>().ok());
        let arg2 = parts.next().and_then(|t| t.parse::<i32>().ok());

        match (command, arg1, arg2) {
            ("i", Some(key), _) => {
                match self.tree.insert(key, Record::Int(key)) {
                    Ok(Some(_)) => println!("Duplicate key {} ignored", key),
                    Ok(None) => {}
                    Err(err) => eprintln!("error: {}", err),
                }
                printer::print_tree(&self.tree, self.verbose);
            }
            ("d", Some(key), _) => {
                match self.tree.delete(key) {
                    Ok(_) => {}
                    Err(err) => eprintln!("error: {}", err),
                }
                printer::print_tree(&self.tree, self.verbose);
            }
            ("f", Some(key), _) => printer::find_and_print(&self.tree, key, false),
            ("p", Some(key), _) => printer::find_and_print(&self.tree, key, true),
            ("r", Some(a), Some(b)) => {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                printer::find_and_print_range(&self.tree, lo, hi);
            }
            ("l", _, _) => printer::print_leaves(&self.tree, self.verbose),
            ("t", _, _) => printer::print_tree(&self.tree, self.verbose),
            ("x", _, _) => {
                self.tree.purge();
                printer::print_tree(&self.tree, self.verbose);
            }
            ("v", _, _) => {
                self.verbose = !self.verbose;
                println!(
                    "Verbose output: {}",
                    if self.verbose { "on" } else { "off" }
                );
            }
            ("a", _, _) => self.print_status(),
            ("s", _, _) => self.save(),
            ("o", _, _) => self.restore(),
            ("q", _, _) => return false,
            ("i", None, _) | ("d", None, _) | ("f", None, _) | ("p", None, _) => {
                println!("expected: {} <key>", command)
            }
            ("r", _, _) => println!("expected: r <k1> <k2>"),
            _ => self.print_help(),
        }
        true
    }

    fn save(&self) {
        let result = StoreFile::create(&self.store)
            .and_then(|mut store| store.register_schema(SCHEMA_ID, self.tree.order() as u16));
        match result {
            Ok(_) => println!("Saved schema to {}", self.store.path.display()),
            Err(err) => eprintln!("error: {}", err),
        }
    }

    fn restore(&mut self) {
        let slot = match StoreFile::open(&self.store.path)
            .and_then(|mut store| store.read_schema(SCHEMA_ID))
        {
            Ok(slot) => slot,
            Err(err) => {
                eprintln!("error: {}", err);
                return;
            }
        };
        if !self.tree.is_empty() {
            println!("Tree is not empty; restore skipped");
            return;
        }
        match self.tree.set_order(slot.order as usize) {
            Ok(()) => println!(
                "Restored order {} from {}",
                slot.order,
                self.store.path.display()
            ),
            Err(err) => eprintln!("error: {}", err),
        }
    }
}
