// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Deterministic byte-buffer mutation kernel.
//!
//! The kernel loads the persisted seed buffer, seeds a PRNG from the caller's
//! seed, and runs `iterations` mutation passes over the buffer. Every pass
//! visits each byte once and replaces it with probability
//! [`MUTATION_PROBABILITY`]. After every [`GROWTH_INTERVAL`]th pass the buffer
//! grows by [`GROWTH_BYTES`] random bytes, so
//! `final_len = initial_len + GROWTH_BYTES * floor(iterations / GROWTH_INTERVAL)`.
//!
//! The seed file is the only state carried between invocations. It is written
//! once, when missing, and never modified afterwards.

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::KernelError;

/// File name of the persisted seed buffer.
pub const SEED_FILE_NAME: &str = "_seed_";

/// Content written when no seed file exists yet.
pub const DEFAULT_SEED: &[u8] = b"InitialSeedData";

/// Per-byte replacement probability for one pass.
pub const MUTATION_PROBABILITY: f64 = 0.13;

/// The buffer grows after every pass whose 1-indexed number is a multiple of this.
pub const GROWTH_INTERVAL: u64 = 500;

/// Number of random bytes appended at each growth checkpoint.
pub const GROWTH_BYTES: usize = 10;

/// Parsed kernel command line: `<prng_seed> <iterations>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelArgs {
    pub prng_seed: u64,
    pub iterations: u64,
}

impl KernelArgs {
    /// Parse the positional arguments (program name excluded).
    ///
    /// Exactly two arguments are accepted. The seed may be any integer in
    /// `i64` or `u64` range; negative seeds are reinterpreted as `u64`. The
    /// iteration count must be a non-negative integer. Arguments that are
    /// not valid UTF-8 are rejected like any other non-integer.
    pub fn parse<I, S>(args: I) -> Result<Self, KernelError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        if args.len() != 2 {
            return Err(KernelError::InvalidArgument {
                reason: format!("expected 2 arguments, got {}", args.len()),
            });
        }

        let raw_seed = utf8_arg("<prng_seed>", args[0].as_ref())?;
        let prng_seed = raw_seed
            .parse::<i64>()
            .map(|seed| seed as u64)
            .or_else(|_| raw_seed.parse::<u64>())
            .map_err(|_| KernelError::InvalidArgument {
                reason: format!("<prng_seed> must be an integer, got {:?}", raw_seed),
            })?;

        let raw_iterations = utf8_arg("<iterations>", args[1].as_ref())?;
        let iterations = raw_iterations
            .parse::<u64>()
            .map_err(|_| KernelError::InvalidArgument {
                reason: format!(
                    "<iterations> must be a non-negative integer, got {:?}",
                    raw_iterations
                ),
            })?;

        Ok(Self {
            prng_seed,
            iterations,
        })
    }
}

fn utf8_arg<'a>(name: &str, raw: &'a OsStr) -> Result<&'a str, KernelError> {
    raw.to_str().ok_or_else(|| KernelError::InvalidArgument {
        reason: format!("{} must be an integer, got {:?}", name, raw),
    })
}

/// The mutation subject. Its length never shrinks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedBuffer {
    bytes: Vec<u8>,
}

impl SeedBuffer {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Handle to the persisted seed buffer on disk.
#[derive(Debug, Clone)]
pub struct SeedFile {
    path: PathBuf,
}

impl SeedFile {
    /// Seed file at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Seed file with the standard name inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SEED_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted buffer, creating the file with [`DEFAULT_SEED`]
    /// first if it does not exist.
    pub fn load_or_create(&self) -> Result<SeedBuffer, KernelError> {
        if !self.path.exists() {
            fs::write(&self.path, DEFAULT_SEED).map_err(|e| KernelError::SeedFile {
                path: self.path.clone(),
                source: e,
            })?;
            tracing::warn!(
                path = %self.path.display(),
                content = %String::from_utf8_lossy(DEFAULT_SEED),
                "Created a default seed file"
            );
        }

        let bytes = fs::read(&self.path).map_err(|e| KernelError::SeedFile {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(SeedBuffer::new(bytes))
    }
}

/// Seeded mutator. Two mutators built from the same seed produce the same
/// byte stream.
pub struct Mutator {
    rng: StdRng,
}

impl Mutator {
    pub fn new(prng_seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(prng_seed),
        }
    }

    /// One pass: each byte is independently replaced with probability
    /// [`MUTATION_PROBABILITY`] by a uniform byte.
    pub fn pass(&mut self, bytes: &mut [u8]) {
        for byte in bytes.iter_mut() {
            if self.rng.gen::<f64>() < MUTATION_PROBABILITY {
                *byte = self.rng.gen::<u8>();
            }
        }
    }

    /// Run `iterations` passes, growing the buffer at each checkpoint.
    pub fn run(&mut self, buffer: &mut SeedBuffer, iterations: u64) {
        for pass in 1..=iterations {
            self.pass(&mut buffer.bytes);

            if pass % GROWTH_INTERVAL == 0 {
                let rng = &mut self.rng;
                buffer
                    .bytes
                    .extend((0..GROWTH_BYTES).map(|_| rng.gen::<u8>()));
            }
        }
    }
}

/// Length of the buffer after `iterations` passes over `initial_len` bytes.
pub fn expected_len(initial_len: usize, iterations: u64) -> usize {
    let checkpoints = (iterations / GROWTH_INTERVAL) as usize;
    initial_len + GROWTH_BYTES * checkpoints
}

/// Load the seed buffer and mutate it. Returns the final buffer.
pub fn mutate(
    prng_seed: u64,
    iterations: u64,
    seed_file: &SeedFile,
) -> Result<Vec<u8>, KernelError> {
    let mut buffer = seed_file.load_or_create()?;
    let initial_len = buffer.len();

    Mutator::new(prng_seed).run(&mut buffer, iterations);

    tracing::debug!(
        prng_seed,
        iterations,
        initial_len,
        final_len = buffer.len(),
        "Mutation complete"
    );

    Ok(buffer.into_bytes())
}

/// Write the buffer as raw bytes, unframed.
pub fn write_output(mut out: impl Write, bytes: &[u8]) -> Result<(), KernelError> {
    out.write_all(bytes)
        .and_then(|_| out.flush())
        .map_err(|e| KernelError::Output { source: e })
}

/// Full kernel invocation: parse arguments, mutate, emit to stdout.
/// Nothing is written to stdout unless mutation succeeded.
pub fn run_cli<I, S>(args: I, seed_file: &SeedFile) -> Result<(), KernelError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args = KernelArgs::parse(args)?;
    let bytes = mutate(args.prng_seed, args.iterations, seed_file)?;
    write_output(io::stdout().lock(), &bytes)
}
