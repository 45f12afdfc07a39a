// Built-in primitives.
//
// Everything here is the part of the language runtime the dispatch
// loop delegates to: constructor-tag hashing, polymorphic element
// access, the pattern-matching predicates, value printing, and console
// I/O. Pattern predicates answer in boxed booleans and never fail;
// element access and length are typed and fault on a mismatch.

use crate::heap::{Heap, Obj};
use crate::value::{boxed, is_int, is_ref, unboxed, Tag, TagSet, Word};
use crate::vm::{Error, Result};
use regex::Regex;
use std::io::{self, BufRead, Write};


// Constructor names hash to 6 bits per character, at most five
// characters, so the hash is exactly invertible.
const TAG_CHARS: &[u8] = b"_abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn tag_hash(name: &[u8]) -> Result<i32> {
    let mut h: i32 = 0;
    for &c in name.iter().take(5) {
        match TAG_CHARS.iter().position(|&t| t == c) {
            Some(pos) => h = (h << 6) | pos as i32,
            None => return Err(Error::BadTag(c as char)),
        }
    }
    Ok(h)
}

pub fn de_hash(mut h: i32) -> Vec<u8> {
    let mut name = Vec::new();
    while h != 0 {
        name.push(TAG_CHARS[(h & 0x3F) as usize]);
        h >>= 6;
    }
    name.reverse();
    name
}


// Construct a type error naming what would have been acceptable.
fn expected(expect: TagSet, got: Tag) -> Error {
    Error::TypeError { expect, got }
}

// The kind a word resolves to, faulting on a dangling reference.
pub fn kind_of(heap: &Heap, w: Word) -> Result<Tag> {
    if is_int(w) {
        Ok(Tag::Int)
    } else {
        match heap.get(w) {
            Some(obj) => Ok(obj.tag()),
            None => Err(Error::BadReference(w)),
        }
    }
}


// Polymorphic indexing over strings, arrays and s-expressions. The
// index arrives boxed; string elements come back boxed.
pub fn elem(heap: &Heap, p: Word, i: Word) -> Result<Word> {
    let aggregates = Tag::Str | Tag::Array | Tag::Sexp;
    let i = unboxed(i);
    let kind = kind_of(heap, p)?;
    let slot = match heap.get(p) {
        Some(Obj::Str(b)) => b.get(i as usize).map(|&c| boxed(c as i32)),
        Some(Obj::Array(w)) => w.get(i as usize).copied(),
        Some(Obj::Sexp { elems, .. }) => elems.get(i as usize).copied(),
        _ => return Err(expected(aggregates, kind)),
    };
    slot.ok_or(Error::IllegalIndex(i))
}

// The heap half of STA: store `v` at index `i` of aggregate `x`,
// yielding `v`.
pub fn store(heap: &mut Heap, v: Word, i: Word, x: Word) -> Result<Word> {
    let aggregates = Tag::Str | Tag::Array | Tag::Sexp;
    let kind = kind_of(heap, x)?;
    let i = unboxed(i);
    let slot = match heap.get_mut(x) {
        Some(Obj::Str(b)) => b.get_mut(i as usize).map(|c| *c = unboxed(v) as u8),
        Some(Obj::Array(w)) => w.get_mut(i as usize).map(|s| *s = v),
        Some(Obj::Sexp { elems, .. }) => elems.get_mut(i as usize).map(|s| *s = v),
        _ => return Err(expected(aggregates, kind)),
    };
    match slot {
        Some(()) => Ok(v),
        None => Err(Error::IllegalIndex(i)),
    }
}

pub fn length(heap: &Heap, x: Word) -> Result<Word> {
    let aggregates = Tag::Str | Tag::Array | Tag::Sexp;
    let kind = kind_of(heap, x)?;
    match heap.get(x) {
        Some(obj) if aggregates.contains(obj.tag()) => Ok(boxed(obj.len() as i32)),
        _ => Err(expected(aggregates, kind)),
    }
}


// Pattern predicates: boxed 1 or 0, never a fault.

pub fn matches_tag(heap: &Heap, x: Word, hash: i32, n: i32) -> Word {
    match heap.get(x) {
        Some(Obj::Sexp { tag, elems }) => {
            boxed((*tag == hash && elems.len() == n as usize) as i32)
        }
        _ => boxed(0),
    }
}

pub fn matches_array(heap: &Heap, x: Word, n: i32) -> Word {
    match heap.get(x) {
        Some(Obj::Array(w)) => boxed((w.len() == n as usize) as i32),
        _ => boxed(0),
    }
}

pub fn string_eq(heap: &Heap, x: Word, y: Word) -> Word {
    match (heap.get(x), heap.get(y)) {
        (Some(Obj::Str(a)), Some(Obj::Str(b))) => boxed((a == b) as i32),
        _ => boxed(0),
    }
}

pub fn has_kind(heap: &Heap, x: Word, t: Tag) -> Word {
    match heap.get(x) {
        Some(obj) => boxed((obj.tag() == t) as i32),
        None => boxed(0),
    }
}

pub fn boxed_patt(x: Word) -> Word {
    boxed(is_ref(x) as i32)
}

pub fn unboxed_patt(x: Word) -> Word {
    boxed(is_int(x) as i32)
}


// The printable form of any value. Strings print raw at the top level
// and quoted inside aggregates.
pub fn to_text(heap: &Heap, w: Word) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_value(heap, w, &mut out, false)?;
    Ok(out)
}

fn write_value(heap: &Heap, w: Word, out: &mut Vec<u8>, nested: bool) -> Result<()> {
    if is_int(w) {
        out.extend(unboxed(w).to_string().bytes());
        return Ok(());
    }
    match heap.get(w) {
        Some(Obj::Str(b)) => {
            if nested {
                out.push(b'"');
                out.extend(b);
                out.push(b'"');
            } else {
                out.extend(b);
            }
        }
        Some(Obj::Array(words)) => {
            out.push(b'[');
            for (i, &e) in words.iter().enumerate() {
                if i > 0 {
                    out.extend(b", ");
                }
                write_value(heap, e, out, true)?;
            }
            out.push(b']');
        }
        Some(Obj::Sexp { tag, elems }) => {
            out.extend(de_hash(*tag));
            if !elems.is_empty() {
                out.extend(b" (");
                for (i, &e) in elems.iter().enumerate() {
                    if i > 0 {
                        out.extend(b", ");
                    }
                    write_value(heap, e, out, true)?;
                }
                out.push(b')');
            }
        }
        Some(Obj::Closure { .. }) => out.extend(b"<closure>"),
        None => return Err(Error::BadReference(w)),
    }
    Ok(())
}


// Where the read and write builtins get their integers. The console
// implementation talks to stdin/stdout; tests substitute scripted
// implementations.
pub trait Io {
    fn read(&mut self) -> Result<i32>;
    fn write(&mut self, n: i32) -> Result<()>;
}


pub struct Console;

impl Io for Console {
    fn read(&mut self) -> Result<i32> {
        lazy_static! {
            static ref INT_REGEX: Regex = Regex::new(r"^\s*(-?[0-9]+)").unwrap();
        }

        print!("> ");
        io::stdout().flush().map_err(|e| Error::Io(e.to_string()))?;

        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| Error::Io(e.to_string()))?;

        if let Some(captures) = INT_REGEX.captures(&line) {
            let raw = captures.get(1).unwrap().as_str();
            raw.parse().map_err(|_| Error::BadInput(String::from(raw)))
        } else {
            Err(Error::BadInput(String::from(line.trim())))
        }
    }

    fn write(&mut self, n: i32) -> Result<()> {
        println!("{}", n);
        Ok(())
    }
}
