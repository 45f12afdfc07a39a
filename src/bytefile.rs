// The compiled bytecode image.
//
// The on-disk layout is little-endian and fixed:
//
//   i32      stringtab_size          bytes
//   i32      global_area_size        words
//   i32      public_symbols_number   N
//   i32 * 2N public symbols          (name offset, code offset) pairs
//   u8  *    string table            NUL-terminated, addressed by offset
//   u8  *    code                    to end of file
//
// The code size is whatever remains after the header, the symbols and
// the string table. Public symbols are kept for tooling; the
// interpreter core never consults them.

use std::fs;

pub struct Bytefile {
    pub strings: Vec<u8>,
    pub publics: Vec<(i32, i32)>,
    pub globals: usize,
    pub code: Vec<u8>,
}

pub type LoadResult = std::result::Result<Bytefile, String>;

fn int_at(bytes: &[u8], pos: usize) -> Result<i32, String> {
    match bytes.get(pos..pos + 4) {
        Some(b) => Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(String::from("truncated bytecode file")),
    }
}

impl Bytefile {
    pub fn parse(bytes: &[u8]) -> LoadResult {
        let stringtab_size = int_at(bytes, 0)?;
        let global_area_size = int_at(bytes, 4)?;
        let public_symbols_number = int_at(bytes, 8)?;

        if stringtab_size < 0 || global_area_size < 0 || public_symbols_number < 0 {
            return Err(String::from("corrupt bytecode header"));
        }

        let n = public_symbols_number as usize;
        let mut publics = Vec::with_capacity(n);
        for i in 0..n {
            let name = int_at(bytes, 12 + i * 8)?;
            let offset = int_at(bytes, 16 + i * 8)?;
            publics.push((name, offset));
        }

        let strings_start = 12 + n * 8;
        let code_start = strings_start + stringtab_size as usize;
        if code_start > bytes.len() {
            return Err(String::from("truncated bytecode file"));
        }

        Ok(Bytefile {
            strings: bytes[strings_start..code_start].to_vec(),
            publics,
            globals: global_area_size as usize,
            code: bytes[code_start..].to_vec(),
        })
    }

    // A string is a NUL-terminated run starting at the given byte
    // offset of the string table.
    pub fn string(&self, offset: usize) -> Option<&[u8]> {
        let tail = self.strings.get(offset..)?;
        let end = tail.iter().position(|&b| b == 0)?;
        Some(&tail[..end])
    }

    pub fn public_name(&self, i: usize) -> Option<&[u8]> {
        let (name, _) = *self.publics.get(i)?;
        self.string(name as usize)
    }

    pub fn public_offset(&self, i: usize) -> Option<i32> {
        Some(self.publics.get(i)?.1)
    }
}

pub fn read_file(path: &str) -> LoadResult {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    Bytefile::parse(&bytes)
}


#[cfg(test)]
mod tests {
    use super::*;

    // Assemble an image from its sections, the way the compiler writes
    // one out.
    fn image(strings: &[u8], globals: i32, publics: &[(i32, i32)], code: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(&(strings.len() as i32).to_le_bytes());
        out.extend(&globals.to_le_bytes());
        out.extend(&(publics.len() as i32).to_le_bytes());
        for &(name, offset) in publics {
            out.extend(&name.to_le_bytes());
            out.extend(&offset.to_le_bytes());
        }
        out.extend(strings);
        out.extend(code);
        out
    }

    #[test]
    fn test_round_trip() {
        let bytes = image(b"main\0cons\0", 3, &[(0, 2)], &[0xF0, 0x18]);
        let bf = Bytefile::parse(&bytes).unwrap();
        assert_eq!(bf.globals, 3);
        assert_eq!(bf.strings, b"main\0cons\0".to_vec());
        assert_eq!(bf.publics, vec![(0, 2)]);
        assert_eq!(bf.code, vec![0xF0, 0x18]);
    }

    #[test]
    fn test_string_lookup() {
        let bytes = image(b"main\0cons\0", 0, &[], &[]);
        let bf = Bytefile::parse(&bytes).unwrap();
        assert_eq!(bf.string(0), Some(&b"main"[..]));
        assert_eq!(bf.string(5), Some(&b"cons"[..]));
        assert_eq!(bf.string(7), Some(&b"ns"[..]));
        assert_eq!(bf.string(10), None);
    }

    #[test]
    fn test_publics() {
        let bytes = image(b"main\0f\0", 0, &[(0, 0), (5, 0x2a)], &[]);
        let bf = Bytefile::parse(&bytes).unwrap();
        assert_eq!(bf.public_name(0), Some(&b"main"[..]));
        assert_eq!(bf.public_name(1), Some(&b"f"[..]));
        assert_eq!(bf.public_offset(1), Some(0x2a));
        assert_eq!(bf.public_name(2), None);
    }

    #[test]
    fn test_empty_code() {
        let bytes = image(b"", 0, &[], &[]);
        let bf = Bytefile::parse(&bytes).unwrap();
        assert!(bf.code.is_empty());
    }

    #[test]
    fn test_truncated() {
        assert!(Bytefile::parse(&[]).is_err());
        assert!(Bytefile::parse(&[1, 0, 0, 0]).is_err());
        // Header promises more strings than the file holds.
        let mut bytes = image(b"main\0", 0, &[], &[]);
        bytes.truncate(14);
        assert!(Bytefile::parse(&bytes).is_err());
    }

    #[test]
    fn test_corrupt_header() {
        let bytes = image(b"", -1, &[], &[]);
        assert!(Bytefile::parse(&bytes).is_err());
    }
}
