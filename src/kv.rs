//! Key/value text input
//!
//! Reads the same format `fmaptool decode` prints: one header line followed
//! by one line per area, each made of `key="value"` pairs.
//!
//! ```text
//! fmap_base="0xfc000000" fmap_size="0x400000" fmap_name="x86_BIOS" fmap_nareas="2"
//! area_offset="0xfc000000" area_size="0x100" area_name="area_1" area_flags="static"
//! area_offset="0xfc000100" area_size="0x100" area_name="area_2" area_flags="compressed,ro"
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Values are taken
//! verbatim up to the next `"` and there is no escaping, so a name that
//! contains `"` cannot be expressed; such input is rejected rather than
//! split at the quote.
//!
//! Keys other than the ones read below are ignored, so `fmap_signature` and the version
//! keys in decoded output are accepted but the library constants are
//! always written. When `area_flags_raw` is present it takes precedence
//! over the flag names.

use fmap_core::{Area, AreaFlags, Flashmap};

use crate::error::{CliError, Result};

/// Parse a number that can be hex (0x...) or decimal
pub fn parse_number(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).map_err(|e| format!("invalid hex value \"{}\": {}", s, e))
    } else {
        s.parse::<u64>()
            .map_err(|e| format!("invalid number \"{}\": {}", s, e))
    }
}

/// Split a line into its `key="value"` pairs
pub fn parse_pairs(line: &str) -> std::result::Result<Vec<(&str, &str)>, String> {
    let mut pairs = Vec::new();
    let mut rest = line.trim_start();

    while !rest.is_empty() {
        let eq = rest
            .find('=')
            .ok_or_else(|| format!("expected key=\"value\" at \"{}\"", rest))?;
        let key = &rest[..eq];
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(format!("invalid key \"{}\"", key));
        }

        let value_start = rest[eq + 1..]
            .strip_prefix('"')
            .ok_or_else(|| format!("value for \"{}\" is not quoted", key))?;
        let close = value_start
            .find('"')
            .ok_or_else(|| format!("missing end-quote for \"{}\"", key))?;

        let after = &value_start[close + 1..];
        if !after.is_empty() && !after.starts_with(char::is_whitespace) {
            return Err(format!(
                "value for \"{}\" runs into \"{}\" (values cannot contain '\"')",
                key, after
            ));
        }

        pairs.push((key, &value_start[..close]));
        rest = after.trim_start();
    }

    Ok(pairs)
}

/// One parsed input line
struct KvLine<'a> {
    line: usize,
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> KvLine<'a> {
    fn parse(line: usize, text: &'a str) -> Result<Self> {
        let pairs = parse_pairs(text).map_err(|message| CliError::Parse { line, message })?;
        Ok(Self { line, pairs })
    }

    fn error(&self, message: impl Into<String>) -> CliError {
        CliError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn find(&self, key: &str) -> Option<&'a str> {
        self.pairs.iter().find(|(k, _)| *k == key).map(|&(_, v)| v)
    }

    fn get(&self, key: &str) -> Result<&'a str> {
        self.find(key)
            .ok_or_else(|| self.error(format!("key \"{}\" not found", key)))
    }

    fn number<T: TryFrom<u64>>(&self, key: &str) -> Result<T> {
        let value = parse_number(self.get(key)?).map_err(|e| self.error(e))?;
        T::try_from(value).map_err(|_| self.error(format!("value for \"{}\" is out of range", key)))
    }
}

/// Build a flashmap from key/value text
pub fn read_flashmap(text: &str) -> Result<Flashmap> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l))
        .filter(|(_, l)| !l.trim().is_empty() && !l.trim_start().starts_with('#'));

    let (line_no, header_text) = lines.next().ok_or(CliError::Parse {
        line: 0,
        message: "input is empty".to_string(),
    })?;
    let header = KvLine::parse(line_no, header_text)?;

    let mut fmap = Flashmap::create(
        header.number("fmap_base")?,
        header.number("fmap_size")?,
        header.get("fmap_name")?,
    )
    .map_err(|e| header.error(e.to_string()))?;
    let nareas: u16 = header.number("fmap_nareas")?;

    for (line_no, text) in lines {
        let line = KvLine::parse(line_no, text)?;
        let flags = match line.find("area_flags_raw") {
            Some(_) => AreaFlags::from_bits_retain(line.number("area_flags_raw")?),
            None => AreaFlags::from_names(line.get("area_flags")?)
                .map_err(|e| line.error(e.to_string()))?,
        };
        let area = Area::new(
            line.number("area_offset")?,
            line.number("area_size")?,
            line.get("area_name")?,
            flags,
        )
        .map_err(|e| line.error(e.to_string()))?;
        fmap.push_area(area).map_err(|e| line.error(e.to_string()))?;
    }

    if fmap.area_count() != nareas {
        return Err(header.error(format!(
            "fmap_nareas is {} but {} areas were given",
            nareas,
            fmap.area_count()
        )));
    }

    log::debug!(
        "Parsed flashmap \"{}\" with {} areas",
        fmap.name,
        fmap.area_count()
    );
    Ok(fmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs() {
        assert_eq!(parse_pairs("foo=\"bar\"").unwrap(), vec![("foo", "bar")]);
        assert_eq!(
            parse_pairs("  a=\"1\"  b=\"two words\" c=\"\"").unwrap(),
            vec![("a", "1"), ("b", "two words"), ("c", "")]
        );
        assert!(parse_pairs("foo=\"bar").unwrap_err().contains("end-quote"));
        assert!(parse_pairs("foo=bar").is_err());
        assert!(parse_pairs("foo").is_err());
        assert!(parse_pairs("a=\"1\"b=\"2\"").is_err());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0x100"), Ok(0x100));
        assert_eq!(parse_number("0XFF"), Ok(0xFF));
        assert_eq!(parse_number("4096"), Ok(4096));
        assert!(parse_number("0xzz").is_err());
        assert!(parse_number("ten").is_err());
    }

    #[test]
    fn test_read_flashmap() {
        let text = "\
fmap_base=\"0xfc000000\" fmap_size=\"0x400000\" fmap_name=\"x86_BIOS\" fmap_nareas=\"2\"
area_offset=\"0xfc000000\" area_size=\"0x100\" area_name=\"area_1\" area_flags=\"static\"

area_offset=\"0xfc000100\" area_size=\"256\" area_name=\"area_2\" area_flags=\"compressed,ro\"
";
        let fmap = read_flashmap(text).unwrap();
        assert_eq!(fmap.base, 0xfc00_0000);
        assert_eq!(fmap.size, 0x40_0000);
        assert_eq!(fmap.name, "x86_BIOS");
        assert_eq!(fmap.area_count(), 2);
        assert_eq!(fmap.areas()[0].flags, AreaFlags::STATIC);
        assert_eq!(fmap.areas()[1].offset, 0xfc00_0100);
        assert_eq!(fmap.areas()[1].size, 0x100);
        assert_eq!(
            fmap.areas()[1].flags,
            AreaFlags::COMPRESSED | AreaFlags::RO
        );
    }

    #[test]
    fn test_rendered_output_reads_back() {
        let fmap = Flashmap::create(0, 0x1000, "rt")
            .and_then(|f| f.with_area(0, 0x800, "ro", AreaFlags::STATIC | AreaFlags::RO))
            .and_then(|f| f.with_area(0x800, 0x800, "rw", AreaFlags::from_bits_retain(0x30)))
            .unwrap();

        let parsed = read_flashmap(&fmap_core::render(&fmap)).unwrap();
        assert_eq!(parsed, fmap);
    }

    #[test]
    fn test_quoted_name_is_rejected() {
        let fmap = Flashmap::create(0, 0x1000, "a\"b").unwrap();
        match read_flashmap(&fmap_core::render(&fmap)) {
            Err(CliError::Parse { line: 1, message }) => {
                assert!(message.contains("fmap_name"));
                assert!(message.contains("cannot contain"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_comments_are_skipped() {
        let text = "\
# generated by hand
fmap_base=\"0\" fmap_size=\"0x1000\" fmap_name=\"x\" fmap_nareas=\"1\"
  # areas follow
area_offset=\"0\" area_size=\"0x10\" area_name=\"a\" area_flags=\"static\"
";
        let fmap = read_flashmap(text).unwrap();
        assert_eq!(fmap.area_count(), 1);
        assert_eq!(fmap.areas()[0].name, "a");

        // Line numbers still count skipped lines
        let text = "# header\nfmap_base=\"0\" fmap_size=\"0x1000\" fmap_name=\"x\"\n";
        assert!(matches!(
            read_flashmap(text),
            Err(CliError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_area_count_mismatch() {
        let text = "fmap_base=\"0\" fmap_size=\"0x1000\" fmap_name=\"x\" fmap_nareas=\"2\"\n\
                    area_offset=\"0\" area_size=\"0x10\" area_name=\"a\" area_flags=\"\"\n";
        match read_flashmap(text) {
            Err(CliError::Parse { line: 1, message }) => assert!(message.contains("fmap_nareas")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let text = "fmap_base=\"0\" fmap_size=\"0x1000\" fmap_name=\"x\" fmap_nareas=\"1\"\n\
                    area_offset=\"0\" area_name=\"a\" area_flags=\"\"\n";
        match read_flashmap(text) {
            Err(CliError::Parse { line: 2, message }) => assert!(message.contains("area_size")),
            other => panic!("unexpected result: {:?}", other),
        }

        let text = "fmap_base=\"0\" fmap_size=\"0x100000000\" fmap_name=\"x\" fmap_nareas=\"0\"\n";
        assert!(matches!(
            read_flashmap(text),
            Err(CliError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_name_too_long() {
        let long = "n".repeat(fmap_core::FMAP_STRLEN + 1);
        let text = format!(
            "fmap_base=\"0\" fmap_size=\"0\" fmap_name=\"{}\" fmap_nareas=\"0\"\n",
            long
        );
        match read_flashmap(&text) {
            Err(CliError::Parse { line: 1, message }) => assert!(message.contains("maximum")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_flag_name() {
        let text = "fmap_base=\"0\" fmap_size=\"0\" fmap_name=\"x\" fmap_nareas=\"1\"\n\
                    area_offset=\"0\" area_size=\"0\" area_name=\"a\" area_flags=\"sticky\"\n";
        assert!(matches!(
            read_flashmap(text),
            Err(CliError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(
            read_flashmap("\n\n"),
            Err(CliError::Parse { line: 0, .. })
        ));
    }
}
