use anyhow::{Context, Result, bail};
use bitvec::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;
use tess_core::sampler::ShotMatrix;

/// Loads a Stim .b8 file (binary measurement data).
pub fn load_b8_file<P: AsRef<Path>>(path: P) -> Result<BitVec<u8, Lsb0>> {
    let mut file = File::open(path).context("Failed to open .b8 file")?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;

    // Stim packs each shot little-endian within a byte
    let bits = BitVec::<u8, Lsb0>::from_vec(buffer);
    Ok(bits)
}

/// Splits packed .b8 data into shots of `bits_per_shot` outcomes.
///
/// Every shot starts on a byte boundary; padding bits are dropped. A
/// trailing partial shot is an error.
pub fn slice_shots(raw_bits: &BitVec<u8, Lsb0>, bits_per_shot: usize) -> Result<ShotMatrix> {
    let bytes_per_shot = bits_per_shot.div_ceil(8);
    let stride_bits = bytes_per_shot * 8;
    if stride_bits == 0 {
        bail!("shots must hold at least one measurement");
    }
    if raw_bits.len() % stride_bits != 0 {
        bail!(
            "{} bytes of .b8 data is not a whole number of {}-byte shots",
            raw_bits.len() / 8,
            bytes_per_shot
        );
    }

    let num_shots = raw_bits.len() / stride_bits;
    let mut shots = ShotMatrix::with_capacity(bits_per_shot, num_shots);
    let mut shot = Vec::with_capacity(bits_per_shot);

    for i in 0..num_shots {
        let start = i * stride_bits;
        let end = start + bits_per_shot;

        shot.clear();
        shot.extend(raw_bits[start..end].iter().map(|b| *b as u8));
        shots.push_shot(&shot)?;
    }

    Ok(shots)
}

/// Writes shots in Stim's .b8 format.
pub fn write_b8_file<P: AsRef<Path>>(path: P, shots: &ShotMatrix) -> Result<()> {
    let stride_bits = shots.bits_per_shot().div_ceil(8) * 8;
    let mut bits = BitVec::<u8, Lsb0>::repeat(false, stride_bits * shots.num_shots());
    for (i, shot) in shots.iter().enumerate() {
        let start = i * stride_bits;
        for (j, &b) in shot.iter().enumerate() {
            bits.set(start + j, b == 1);
        }
    }

    let mut file = File::create(path).context("Failed to create .b8 file")?;
    file.write_all(bits.as_raw_slice())?;
    Ok(())
}

/// Loads a 01 file: one shot per line, one `0`/`1` character per outcome.
pub fn load_01_file<P: AsRef<Path>>(path: P, bits_per_shot: usize) -> Result<ShotMatrix> {
    let file = File::open(path).context("Failed to open 01 file")?;
    let reader = BufReader::new(file);

    let mut shots = ShotMatrix::new(bits_per_shot);
    let mut shot = Vec::with_capacity(bits_per_shot);

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        shot.clear();
        for c in trimmed.chars() {
            match c {
                '0' => shot.push(0),
                '1' => shot.push(1),
                _ => bail!("line {}: unexpected character {c:?}", n + 1),
            }
        }
        shots
            .push_shot(&shot)
            .with_context(|| format!("line {}", n + 1))?;
    }

    Ok(shots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tess_io_{}_{name}", std::process::id()))
    }

    #[test]
    fn b8_round_trip_pads_each_shot() {
        let mut shots = ShotMatrix::new(10);
        shots.push_shot(&[1, 0, 0, 0, 0, 0, 0, 0, 1, 1]).unwrap();
        shots.push_shot(&[0, 1, 0, 0, 0, 0, 0, 0, 0, 1]).unwrap();

        let path = temp_path("round_trip.b8");
        write_b8_file(&path, &shots).unwrap();
        let raw = std::fs::read(&path).unwrap();
        assert_eq!(raw, [0b0000_0001, 0b0000_0011, 0b0000_0010, 0b0000_0010]);

        let loaded = slice_shots(&load_b8_file(&path).unwrap(), 10).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, shots);
    }

    #[test]
    fn partial_shot_is_rejected() {
        let bits = BitVec::<u8, Lsb0>::from_vec(vec![0; 3]);
        assert!(slice_shots(&bits, 10).is_err());
    }

    #[test]
    fn reads_01_lines() {
        let path = temp_path("shots.01");
        std::fs::write(&path, "0110\n\n1001\n").unwrap();
        let shots = load_01_file(&path, 4).unwrap();
        assert_eq!(shots.num_shots(), 2);
        assert_eq!(shots.shot(1), Some(&[1u8, 0, 0, 1][..]));

        std::fs::write(&path, "0110\n011\n").unwrap();
        assert!(load_01_file(&path, 4).is_err());
        std::fs::write(&path, "01x0\n").unwrap();
        assert!(load_01_file(&path, 4).is_err());
        std::fs::remove_file(&path).ok();
    }
}
