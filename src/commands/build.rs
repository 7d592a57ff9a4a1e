//! Flashmap generation commands

use std::fs;
use std::path::Path;

use fmap_core::{AreaFlags, Flashmap, Result as FmapResult};

use super::write_file;
use crate::error::{CliError, Result};
use crate::kv;

/// Load address of the example image
const EXAMPLE_BASE: u64 = 0xfc00_0000;
/// Size of the example image (4 MiB)
const EXAMPLE_SIZE: u32 = 4096 * 1024;
/// Name of the example image
const EXAMPLE_NAME: &str = "x86_BIOS";

/// Generate a binary flashmap from a key/value text file
pub fn cmd_encode(input: &Path, output: &Path) -> Result<()> {
    let text = fs::read_to_string(input).map_err(|source| CliError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let fmap = kv::read_flashmap(&text)?;

    write_file(output, &fmap.encode())?;
    println!(
        "Wrote {} byte flashmap with {} areas to {:?}",
        fmap.serialized_size(),
        fmap.area_count(),
        output
    );
    Ok(())
}

/// Build the example four-area flashmap
pub fn example_flashmap() -> FmapResult<Flashmap> {
    let mut fmap = Flashmap::create(EXAMPLE_BASE, EXAMPLE_SIZE, EXAMPLE_NAME)?;
    fmap.append_area(EXAMPLE_BASE as u32, 0x100, "area_1", AreaFlags::STATIC)?;
    fmap.append_area(EXAMPLE_BASE as u32 + 0x100, 0x100, "area_2", AreaFlags::COMPRESSED)?;
    fmap.append_area(EXAMPLE_BASE as u32 + 0x200, 0x100, "area_3", AreaFlags::RO)?;
    fmap.append_area(
        EXAMPLE_BASE as u32 + 0x300,
        0x100,
        "area_4",
        AreaFlags::COMPRESSED | AreaFlags::RO,
    )?;
    Ok(fmap)
}

/// Write the example flashmap and print it
pub fn cmd_example(output: &Path) -> Result<()> {
    let fmap = example_flashmap()?;
    print!("{}", fmap.display());
    write_file(output, &fmap.encode())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmap_core::{locate, AREA_SIZE, HEADER_SIZE};

    #[test]
    fn test_example_flashmap() {
        let fmap = example_flashmap().unwrap();
        assert_eq!(fmap.area_count(), 4);
        assert_eq!(fmap.serialized_size(), HEADER_SIZE + 4 * AREA_SIZE);
        assert_eq!(fmap.areas()[3].offset, 0xfc00_0300);
        assert_eq!(
            fmap.areas()[3].flags,
            AreaFlags::COMPRESSED | AreaFlags::RO
        );
    }

    #[test]
    fn test_cmd_example_writes_locatable_map() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("example.bin");
        cmd_example(&out).unwrap();

        let data = fs::read(&out).unwrap();
        assert_eq!(locate(&data), Ok(0));
        assert_eq!(Flashmap::decode(&data).unwrap(), example_flashmap().unwrap());
    }

    #[test]
    fn test_cmd_encode() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fmap.txt");
        let output = dir.path().join("fmap.bin");
        fs::write(
            &input,
            "fmap_base=\"0\" fmap_size=\"0x2000\" fmap_name=\"kv\" fmap_nareas=\"1\"\n\
             area_offset=\"0x1000\" area_size=\"0x1000\" area_name=\"boot\" area_flags=\"static,ro\"\n",
        )
        .unwrap();

        cmd_encode(&input, &output).unwrap();

        let fmap = Flashmap::decode(&fs::read(&output).unwrap()).unwrap();
        assert_eq!(fmap.name, "kv");
        assert_eq!(fmap.find_area("boot").unwrap().flags, AreaFlags::STATIC | AreaFlags::RO);
    }

    #[test]
    fn test_cmd_encode_bad_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fmap.txt");
        let output = dir.path().join("fmap.bin");
        fs::write(&input, "fmap_base=\"0\" fmap_name=\"kv\"\n").unwrap();

        assert!(matches!(
            cmd_encode(&input, &output),
            Err(CliError::Parse { line: 1, .. })
        ));
        assert!(!output.exists());
    }
}
