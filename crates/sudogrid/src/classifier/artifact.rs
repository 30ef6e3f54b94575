//! Binary persistence of the training session.
//!
//! Little-endian throughout, no header or magic — consumers validate the
//! structure as they read it:
//!
//! ```text
//! <u32 N_train>
//! repeat N_train:
//!   <u32 expected_label>          (0..255 stored in u32)
//!   <u32 input_len>
//!   <f32 × input_len>
//! <u32 N_test = 0>                (reserved)
//! <u32 N_layers>
//! repeat N_layers:
//!   <u32 N_neurons>
//!   repeat N_neurons:
//!     <u32 N_weights>
//!     <f32 × N_weights>
//! <u32 N_choices>
//! <u8 × N_choices>
//! ```
//!
//! Neuron rows are stored unpadded (`inputs + 1` weights, bias last); the
//! SIMD padding is reapplied on load.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use super::network::{pad_to_align, Layer, NetworkState, TrainingSample};

/// Default artifact location, relative to the working directory.
pub const DEFAULT_PATH: &str = "training.bin.dat";

/// Upper bound on any count field; larger values mean a corrupt file.
const MAX_COUNT: u32 = 1 << 24;

pub(crate) fn save(path: &Path, state: &NetworkState) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    write_u32(&mut writer, state.training_data.len() as u32)?;
    for sample in &state.training_data {
        write_u32(&mut writer, sample.label as u32)?;
        write_u32(&mut writer, sample.input.len() as u32)?;
        for &value in &sample.input {
            writer.write_all(&value.to_le_bytes())?;
        }
    }

    write_u32(&mut writer, 0)?; // reserved test-set count

    write_u32(&mut writer, state.layers.len() as u32)?;
    for layer in &state.layers {
        write_u32(&mut writer, layer.neurons.len() as u32)?;
        for weights in &layer.neurons {
            let logical = layer.inputs + 1;
            write_u32(&mut writer, logical as u32)?;
            for &weight in &weights[..logical] {
                writer.write_all(&weight.to_le_bytes())?;
            }
        }
    }

    write_u32(&mut writer, state.output_choices.len() as u32)?;
    writer.write_all(&state.output_choices)?;
    writer.flush()
}

/// Read a saved session. `Ok(None)` when no artifact exists; any structural
/// problem is an error and the caller must retrain.
pub(crate) fn load(path: &Path) -> io::Result<Option<NetworkState>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
        Err(error) => return Err(error),
    };
    let mut reader = BufReader::new(file);

    let sample_count = read_count(&mut reader)?;
    let mut training_data = Vec::with_capacity(sample_count.min(4096) as usize);
    for _ in 0..sample_count {
        let label = read_u32(&mut reader)?;
        if label > u8::MAX as u32 {
            return Err(malformed("training label out of range"));
        }
        let input_len = read_count(&mut reader)?;
        let mut input = Vec::with_capacity(input_len as usize);
        for _ in 0..input_len {
            input.push(read_f32(&mut reader)?);
        }
        training_data.push(TrainingSample {
            input,
            label: label as u8,
        });
    }

    let test_count = read_count(&mut reader)?;
    if test_count != 0 {
        return Err(malformed("reserved test-set count must be zero"));
    }

    let layer_count = read_count(&mut reader)?;
    let mut layers = Vec::with_capacity(layer_count.min(16) as usize);
    for _ in 0..layer_count {
        let neuron_count = read_count(&mut reader)?;
        let mut neurons = Vec::with_capacity(neuron_count.min(4096) as usize);
        let mut inputs = 0usize;
        for n in 0..neuron_count {
            let weight_count = read_count(&mut reader)?;
            if weight_count == 0 {
                return Err(malformed("neuron with no weights"));
            }
            if n == 0 {
                inputs = weight_count as usize - 1;
            } else if weight_count as usize != inputs + 1 {
                return Err(malformed("ragged neuron rows in one layer"));
            }
            let mut weights = Vec::with_capacity(pad_to_align(weight_count as usize));
            for _ in 0..weight_count {
                weights.push(read_f32(&mut reader)?);
            }
            weights.resize(pad_to_align(weight_count as usize), 0.0);
            neurons.push(weights);
        }
        layers.push(Layer { neurons, inputs });
    }

    let choice_count = read_count(&mut reader)?;
    let mut output_choices = vec![0u8; choice_count as usize];
    reader.read_exact(&mut output_choices)?;

    let input_size = training_data
        .first()
        .map(|sample| sample.input.len())
        .or_else(|| layers.first().map(|layer| layer.inputs))
        .unwrap_or(0);

    Ok(Some(NetworkState {
        input_size,
        output_choices,
        layers,
        training_data,
    }))
}

fn malformed(message: &str) -> io::Error {
    io::Error::new(ErrorKind::InvalidData, message.to_string())
}

fn write_u32<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_count<R: Read>(reader: &mut R) -> io::Result<u32> {
    let value = read_u32(reader)?;
    if value > MAX_COUNT {
        return Err(malformed("count field exceeds sanity bound"));
    }
    Ok(value)
}

fn read_f32<R: Read>(reader: &mut R) -> io::Result<f32> {
    let mut bytes = [0u8; 4];
    reader.read_exact(&mut bytes)?;
    Ok(f32::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "sudogrid-artifact-{name}-{}.dat",
            std::process::id()
        ));
        path
    }

    fn sample_state() -> NetworkState {
        let mut rng = StdRng::seed_from_u64(11);
        NetworkState {
            input_size: 6,
            output_choices: vec![0, 3, 7],
            layers: vec![Layer::random(3, 6, &mut rng), Layer::random(3, 3, &mut rng)],
            training_data: vec![
                TrainingSample {
                    input: vec![0.0, 1.0, 0.5, 0.25, 1.0, 0.0],
                    label: 3,
                },
                TrainingSample {
                    input: vec![1.0; 6],
                    label: 7,
                },
            ],
        }
    }

    #[test]
    fn round_trip_is_bit_equal() {
        let path = temp_path("roundtrip");
        let state = sample_state();
        save(&path, &state).unwrap();
        let loaded = load(&path).unwrap().unwrap();

        assert_eq!(loaded.input_size, state.input_size);
        assert_eq!(loaded.output_choices, state.output_choices);
        assert_eq!(loaded.training_data, state.training_data);
        assert_eq!(loaded.layers.len(), state.layers.len());
        for (a, b) in loaded.layers.iter().zip(state.layers.iter()) {
            assert_eq!(a.inputs, b.inputs);
            for (wa, wb) in a.neurons.iter().zip(b.neurons.iter()) {
                assert_eq!(wa.len(), wb.len());
                for (&x, &y) in wa.iter().zip(wb.iter()) {
                    assert_eq!(x.to_bits(), y.to_bits());
                }
            }
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = temp_path("missing");
        let _ = std::fs::remove_file(&path);
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn truncated_file_is_malformed() {
        let path = temp_path("truncated");
        let state = sample_state();
        save(&path, &state).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
        assert!(load(&path).is_err());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn absurd_counts_are_malformed() {
        let path = temp_path("counts");
        std::fs::write(&path, u32::MAX.to_le_bytes()).unwrap();
        assert!(load(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
