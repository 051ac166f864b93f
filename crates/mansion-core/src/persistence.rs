//! Save/Load for generated layouts
//!
//! Uses bincode for a compact binary snapshot of a [`MansionLayout`],
//! wrapped with a format version that is checked on load.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::placement::MansionLayout;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a generated layout
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub layout: MansionLayout,
}

/// Save a layout to a writer
pub fn save_layout<W: Write>(writer: W, layout: &MansionLayout) -> Result<(), SaveError> {
    #[derive(Serialize)]
    struct SaveDataRef<'a> {
        version: u32,
        layout: &'a MansionLayout,
    }

    bincode::serialize_into(
        writer,
        &SaveDataRef {
            version: SAVE_VERSION,
            layout,
        },
    )?;
    Ok(())
}

/// Load a layout from a reader
pub fn load_layout<R: Read>(reader: R) -> Result<MansionLayout, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    Ok(save_data.layout)
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}
