//! On-disk artifacts produced by training and consumed by scoring.
//!
//! A training run writes two files, `vectorizer.bin` and `model.bin`. Both
//! share one layout:
//!
//! ```text
//! magic "CNDR" | version u32 | header_len u32 | header | payload_len u32 | payload | crc32 u32
//! ```
//!
//! Integers are little-endian. Header and payload are bincode-encoded; the
//! trailing CRC32 covers the header and payload bytes. The header records the
//! artifact kind, the creation time and a fingerprint shared by the two files
//! of one run, so a vectorizer can never be paired with a model trained
//! against a different vocabulary.

use std::fmt;
use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CandorError, Result};
use crate::ml::logistic::LogisticRegression;
use crate::ml::metrics::EvaluationReport;
use crate::ml::tfidf::VectorizerState;

/// Leading bytes of every artifact file.
pub const MAGIC: [u8; 4] = *b"CNDR";

/// Current artifact format version.
pub const FORMAT_VERSION: u32 = 1;

pub const VECTORIZER_FILE: &str = "vectorizer.bin";
pub const MODEL_FILE: &str = "model.bin";

const TEMP_SUFFIX: &str = ".tmp";

/// What an artifact file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Vectorizer,
    Model,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Vectorizer => f.write_str("vectorizer"),
            ArtifactKind::Model => f.write_str("model"),
        }
    }
}

/// Metadata stored ahead of every payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub kind: ArtifactKind,
    /// Identifies the training run; equal in both files of a pair.
    pub fingerprint: Uuid,
    pub created_at: DateTime<Utc>,
    /// Version of the crate that wrote the file.
    pub crate_version: String,
}

impl ArtifactHeader {
    pub fn new(kind: ArtifactKind, fingerprint: Uuid, created_at: DateTime<Utc>) -> Self {
        ArtifactHeader {
            kind,
            fingerprint,
            created_at,
            crate_version: crate::VERSION.to_string(),
        }
    }
}

/// Payload of `model.bin`: the classifier plus what training measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub classifier: LogisticRegression,
    pub evaluation: EvaluationReport,
    pub train_size: usize,
    pub test_size: usize,
    /// Training rows per label, indexed by label code.
    pub class_counts: [usize; 2],
}

/// Locations of an artifact pair inside a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    pub vectorizer: PathBuf,
    pub model: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        ArtifactPaths {
            vectorizer: dir.join(VECTORIZER_FILE),
            model: dir.join(MODEL_FILE),
        }
    }
}

/// A validated artifact pair.
#[derive(Debug, Clone)]
pub struct LoadedArtifacts {
    pub vectorizer_header: ArtifactHeader,
    pub vectorizer: VectorizerState,
    pub model_header: ArtifactHeader,
    pub model: ModelRecord,
}

impl LoadedArtifacts {
    pub fn fingerprint(&self) -> Uuid {
        self.model_header.fingerprint
    }
}

/// Encode one artifact into its file bytes.
pub fn encode<T: Serialize>(header: &ArtifactHeader, payload: &T) -> Result<Vec<u8>> {
    let header_bytes = bincode::serialize(header)?;
    let payload_bytes = bincode::serialize(payload)?;

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&header_bytes);
    hasher.update(&payload_bytes);

    let mut buf = Vec::with_capacity(header_bytes.len() + payload_bytes.len() + 20);
    buf.extend_from_slice(&MAGIC);
    buf.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    buf.write_u32::<LittleEndian>(frame_len(header_bytes.len())?)?;
    buf.extend_from_slice(&header_bytes);
    buf.write_u32::<LittleEndian>(frame_len(payload_bytes.len())?)?;
    buf.extend_from_slice(&payload_bytes);
    buf.write_u32::<LittleEndian>(hasher.finalize())?;
    Ok(buf)
}

/// Decode and validate artifact bytes read from `path`.
pub fn decode<T: DeserializeOwned>(
    bytes: &[u8],
    expected: ArtifactKind,
    path: &Path,
) -> Result<(ArtifactHeader, T)> {
    let corrupt = |reason: String| CandorError::corrupt(path, reason);
    let truncated = |_: std::io::Error| corrupt("file is truncated".to_string());

    let mut cursor = Cursor::new(bytes);
    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic).map_err(truncated)?;
    if magic != MAGIC {
        return Err(corrupt("not a candor artifact".to_string()));
    }
    let version = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    if version != FORMAT_VERSION {
        return Err(corrupt(format!(
            "unsupported format version {version} (expected {FORMAT_VERSION})"
        )));
    }

    let header_bytes = read_frame(&mut cursor)
        .map_err(|_| corrupt("header frame is truncated".to_string()))?;
    let payload_bytes = read_frame(&mut cursor)
        .map_err(|_| corrupt("payload frame is truncated".to_string()))?;
    let stored_crc = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    if (cursor.position() as usize) != bytes.len() {
        return Err(corrupt("trailing bytes after checksum".to_string()));
    }

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(header_bytes);
    hasher.update(payload_bytes);
    if hasher.finalize() != stored_crc {
        return Err(corrupt("checksum mismatch".to_string()));
    }

    let header: ArtifactHeader = bincode::deserialize(header_bytes)
        .map_err(|e| corrupt(format!("unreadable header: {e}")))?;
    if header.kind != expected {
        return Err(corrupt(format!(
            "expected a {expected} artifact, found a {}",
            header.kind
        )));
    }
    let payload: T = bincode::deserialize(payload_bytes)
        .map_err(|e| corrupt(format!("unreadable payload: {e}")))?;
    Ok((header, payload))
}

/// Read and validate a single artifact file.
pub fn read_artifact<T: DeserializeOwned>(
    path: &Path,
    expected: ArtifactKind,
) -> Result<(ArtifactHeader, T)> {
    if !path.is_file() {
        return Err(CandorError::ArtifactNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    decode(&bytes, expected, path)
}

/// Write an artifact pair into `dir`.
///
/// Both files are encoded in memory and written to temporary names first;
/// they replace any existing pair only once both are on disk. A failure
/// before that point leaves the directory as it was.
pub fn write_pair(
    dir: &Path,
    fingerprint: Uuid,
    vectorizer: &VectorizerState,
    model: &ModelRecord,
) -> Result<ArtifactPaths> {
    let created_at = Utc::now();
    let vectorizer_bytes = encode(
        &ArtifactHeader::new(ArtifactKind::Vectorizer, fingerprint, created_at),
        vectorizer,
    )?;
    let model_bytes = encode(
        &ArtifactHeader::new(ArtifactKind::Model, fingerprint, created_at),
        model,
    )?;

    fs::create_dir_all(dir)?;
    let paths = ArtifactPaths::in_dir(dir);
    let vectorizer_tmp = temp_path(&paths.vectorizer);
    let model_tmp = temp_path(&paths.model);

    let staged = write_synced(&vectorizer_tmp, &vectorizer_bytes)
        .and_then(|_| write_synced(&model_tmp, &model_bytes));
    if let Err(e) = staged {
        let _ = fs::remove_file(&vectorizer_tmp);
        let _ = fs::remove_file(&model_tmp);
        return Err(e);
    }

    fs::rename(&vectorizer_tmp, &paths.vectorizer)?;
    fs::rename(&model_tmp, &paths.model)?;
    log::info!(
        "wrote artifacts {} and {} (fingerprint {fingerprint})",
        paths.vectorizer.display(),
        paths.model.display()
    );
    Ok(paths)
}

/// Read the artifact pair in `dir` and check that it belongs together.
pub fn read_pair(dir: &Path) -> Result<LoadedArtifacts> {
    let paths = ArtifactPaths::in_dir(dir);
    let (vectorizer_header, vectorizer) =
        read_artifact::<VectorizerState>(&paths.vectorizer, ArtifactKind::Vectorizer)?;
    let (model_header, model) = read_artifact::<ModelRecord>(&paths.model, ArtifactKind::Model)?;

    if vectorizer_header.fingerprint != model_header.fingerprint {
        return Err(CandorError::ArtifactMismatch {
            vectorizer: vectorizer_header.fingerprint.to_string(),
            model: model_header.fingerprint.to_string(),
        });
    }
    if vectorizer.terms.len() != model.classifier.n_features() {
        return Err(CandorError::corrupt(
            &paths.model,
            format!(
                "model expects {} features but the vectorizer has {} terms",
                model.classifier.n_features(),
                vectorizer.terms.len()
            ),
        ));
    }

    Ok(LoadedArtifacts {
        vectorizer_header,
        vectorizer,
        model_header,
        model,
    })
}

fn frame_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        CandorError::invalid_argument(format!("artifact section of {len} bytes is too large"))
    })
}

fn read_frame<'a>(cursor: &mut Cursor<&'a [u8]>) -> std::io::Result<&'a [u8]> {
    let len = cursor.read_u32::<LittleEndian>()? as usize;
    let bytes: &'a [u8] = *cursor.get_ref();
    let start = cursor.position() as usize;
    let end = start
        .checked_add(len)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::UnexpectedEof))?;
    cursor.set_position(end as u64);
    Ok(&bytes[start..end])
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}
